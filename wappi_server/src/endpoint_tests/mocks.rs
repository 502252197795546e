use chrono::{TimeZone, Utc};
use mockall::mock;
use wappi_engine::{
    db_types::{
        ClaimToken,
        DeliveryPricing,
        ImportData,
        ImportRecord,
        Location,
        NewImportRecord,
        NewOrder,
        Order,
        OrderData,
        OrderId,
        OrderItem,
        OrderStatusType,
        OrderUpdate,
        Settings,
        SettingsUpdate,
    },
    traits::{
        ImportApiError,
        ImportManagement,
        OrderApiError,
        OrderManagement,
        SettingsApiError,
        SettingsManagement,
    },
};

mock! {
    pub Database {}
    impl OrderManagement for Database {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError>;
        async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderApiError>;
        async fn update_order(&self, id: &OrderId, update: OrderUpdate) -> Result<Option<Order>, OrderApiError>;
        async fn update_order_status(&self, id: &OrderId, status: OrderStatusType) -> Result<Option<Order>, OrderApiError>;
        async fn fetch_orders(&self) -> Result<Vec<Order>, OrderApiError>;
        async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError>;
        async fn insert_claim_token(&self, token: &str, order_id: &OrderId) -> Result<ClaimToken, OrderApiError>;
        async fn fetch_claim_token(&self, token: &str) -> Result<Option<ClaimToken>, OrderApiError>;
        async fn assign_user(&self, id: &OrderId, user_id: &str) -> Result<bool, OrderApiError>;
    }
    impl ImportManagement for Database {
        async fn insert_import_record(&self, record: NewImportRecord) -> Result<ImportRecord, ImportApiError>;
        async fn fetch_import_records(&self) -> Result<Vec<ImportRecord>, ImportApiError>;
        async fn fetch_import_record(&self, id: &str) -> Result<Option<ImportRecord>, ImportApiError>;
        async fn update_import_record(&self, id: &str, data: ImportData, profile_id: Option<String>) -> Result<Option<ImportRecord>, ImportApiError>;
        async fn delete_import_record(&self, id: &str) -> Result<bool, ImportApiError>;
        async fn delete_all_import_records(&self) -> Result<u64, ImportApiError>;
    }
    impl SettingsManagement for Database {
        async fn fetch_settings(&self) -> Result<Settings, SettingsApiError>;
        async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, SettingsApiError>;
    }
}

pub const ORDER_ID: &str = "6f1b3c2e-8d4a-4f5b-9c7e-1a2b3c4d5e6f";

pub fn order(user_id: Option<&str>) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Order {
        id: ORDER_ID.parse().unwrap(),
        profile_id: Some("panaderia".into()),
        user_id: user_id.map(String::from),
        status: OrderStatusType::Created,
        status_message: None,
        eta: Some("30 min".into()),
        data: OrderData { items: vec![OrderItem::new("Pan", 1200.0, 2)] },
        delivery_fee: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn claim_token(token: &str) -> ClaimToken {
    ClaimToken { token: token.to_string(), order_id: ORDER_ID.to_string(), created_at: Utc::now() }
}

pub fn settings() -> Settings {
    Settings {
        business_name: "Panadería".into(),
        business_location: Location::new(4.711, -74.0721),
        default_map_location: Location::new(4.711, -74.0721),
        default_map_zoom: 13,
        default_item_weight: 1,
        delivery: DeliveryPricing { base_price: 3000.0, price_per_km: 1000.0, price_per_kg: 500.0 },
        updated_at: Utc::now(),
    }
}

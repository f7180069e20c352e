use mockall::mock;
use raffle_payment_engine::{
    db_types::{
        GatewaySettings,
        MediaRecord,
        NewMediaRecord,
        NewOrder,
        Order,
        OrderId,
        OrderStatusType,
        PaymentSettings,
        Role,
        StoredPaymentSettings,
    },
    AuthApiError,
    GatewayError,
    GatewaySession,
    GatewayStatus,
    InsertOrderResult,
    MediaManagement,
    OrderManagement,
    PaymentGatewayClient,
    PaymentGatewayDatabase,
    RoleManagement,
    SettingsManagement,
    StorageError,
};

mock! {
    pub RoleManager {}
    impl RoleManagement for RoleManager {
        async fn fetch_roles_for_user(&self, user_id: &str) -> Result<Vec<Role>, AuthApiError>;
        async fn check_user_has_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError>;
        async fn assign_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError>;
        async fn remove_roles(&self, user_id: &str, roles: &[Role]) -> Result<u64, AuthApiError>;
    }
}

mock! {
    pub SettingsManager {}
    impl SettingsManagement for SettingsManager {
        async fn fetch_payment_settings(&self) -> Result<Option<StoredPaymentSettings>, StorageError>;
        async fn upsert_payment_settings(&self, settings: &PaymentSettings) -> Result<StoredPaymentSettings, StorageError>;
    }
}

mock! {
    pub MediaManager {}
    impl MediaManagement for MediaManager {
        async fn insert_media_record(&self, record: &NewMediaRecord, created_by: &str) -> Result<MediaRecord, StorageError>;
        async fn fetch_media_records(&self) -> Result<Vec<MediaRecord>, StorageError>;
    }
}

mock! {
    pub GatewayDb {}
    impl Clone for GatewayDb {
        fn clone(&self) -> Self;
    }
    impl OrderManagement for GatewayDb {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError>;
        async fn fetch_order_by_resource_path(&self, resource_path: &str) -> Result<Option<Order>, StorageError>;
        async fn fetch_orders_by_status(&self, statuses: &[OrderStatusType]) -> Result<Vec<Order>, StorageError>;
    }
    impl PaymentGatewayDatabase for GatewayDb {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StorageError>;
        async fn attach_gateway_session(&self, order_id: &OrderId, resource_path: &str) -> Result<Option<Order>, StorageError>;
        async fn transition_order_status(&self, order_id: &OrderId, from: &[OrderStatusType], to: OrderStatusType) -> Result<Option<Order>, StorageError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGatewayClient for Gateway {
        fn validate_resource_path(&self, resource_path: &str) -> Result<(), GatewayError>;
        async fn begin_transaction(&self, order: &Order, settings: &GatewaySettings) -> Result<GatewaySession, GatewayError>;
        async fn fetch_status(&self, resource_path: &str, settings: &GatewaySettings) -> Result<GatewayStatus, GatewayError>;
    }
}

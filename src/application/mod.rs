pub mod auth_service;
pub mod order_service;
pub mod product_service;
pub mod record_service;

pub use auth_service::AuthService;
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use record_service::RecordService;

use crate::auth::TokenService;
use crate::db::DbPool;
use crate::infrastructure::{
    DieselOrderRepository, DieselProductRepository, DieselRecordRepository, DieselUserRepository,
};

/// Every service the HTTP layer needs, wired to the Diesel repositories.
pub struct AppServices {
    pub products: ProductService<DieselProductRepository>,
    pub orders: OrderService<DieselOrderRepository>,
    pub records: RecordService<DieselRecordRepository>,
    pub auth: AuthService<DieselUserRepository>,
}

impl AppServices {
    pub fn new(pool: DbPool, tokens: TokenService) -> Self {
        Self {
            products: ProductService::new(DieselProductRepository::new(pool.clone())),
            orders: OrderService::new(DieselOrderRepository::new(pool.clone())),
            records: RecordService::new(DieselRecordRepository::new(pool.clone())),
            auth: AuthService::new(DieselUserRepository::new(pool), tokens),
        }
    }
}

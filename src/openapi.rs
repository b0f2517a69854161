use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::errors::FieldError;
use crate::handlers::{auth, orders, products, records};

#[derive(OpenApi)]
#[openapi(
    info(title = "Inventory service", description = "Products, orders, stock and sales records"),
    paths(
        auth::login,
        auth::refresh,
        auth::logout,
        auth::verify_token,
        products::list_products,
        products::get_product,
        products::create_product,
        products::replace_product,
        products::patch_product,
        products::delete_product,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::replace_order,
        orders::patch_order,
        orders::delete_order,
        orders::complete_order,
        orders::add_item,
        orders::update_item,
        orders::remove_item,
        records::list_sales,
        records::get_sale,
        records::record_sale,
        records::reverse_sale,
        records::list_combined,
    ),
    components(schemas(FieldError)),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Token issue and revocation"),
        (name = "products", description = "Catalog and stock levels"),
        (name = "orders", description = "Order fulfillment"),
        (name = "records", description = "Sale and combined records"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

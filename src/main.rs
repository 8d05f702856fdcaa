//! Demo: one order from placement to settlement.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

use courier_escrow::config::FulfillmentConfig;
use courier_escrow::lifecycle::{setup_tracing, FulfillmentSystem};
use courier_escrow::model::{
    Caller, PaymentMethod, PlaceOrder, ProductCreate, Role, Shipping, UserCreate,
};
use courier_escrow::order_actor::PaymentOutcome;
use rust_decimal::Decimal;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();
    let config = FulfillmentConfig::from_env()?;
    let system = FulfillmentSystem::new(config)?;
    let service = system.service.clone();

    let register = |name: &str, phone: &str, role: Role| UserCreate {
        name: name.to_string(),
        phone: phone.to_string(),
        role,
    };
    let users = &system.user_client;
    let buyer = Caller::new(
        users
            .create_user(register("Aziza", "+998901112233", Role::Buyer))
            .await?,
        Role::Buyer,
    );
    let seller = Caller::new(
        users
            .create_user(register("Bekzod", "+998907778899", Role::Seller))
            .await?,
        Role::Seller,
    );
    let courier = Caller::new(
        users
            .create_user(register("Dilshod", "+998935554433", Role::Courier))
            .await?,
        Role::Courier,
    );
    let admin = Caller::new(
        users
            .create_user(register("Ops", "+998900000000", Role::Admin))
            .await?,
        Role::Admin,
    );

    let product_id = system
        .product_client
        .create_product(ProductCreate {
            seller_id: seller.user_id,
            title: "Atlas silk scarf".to_string(),
            price: Decimal::from(50_000),
            currency: "UZS".to_string(),
            stock: 5,
        })
        .await?;

    let span = tracing::info_span!("order_flow");
    let record = async {
        let placed = service
            .place_order(
                buyer,
                PlaceOrder {
                    product_id,
                    video_id: None,
                    quantity: 2,
                    payment_method: PaymentMethod::Payme,
                    shipping: Shipping {
                        address: "Amir Temur 1, apt 4".to_string(),
                        city: "Tashkent".to_string(),
                        phone: "+998901112233".to_string(),
                    },
                    buyer_note: Some("Ring twice".to_string()),
                },
            )
            .await?;
        let id = placed.order.id;
        let pickup = placed
            .order
            .pickup_proof
            .clone()
            .ok_or("order placed without a pickup proof")?;

        service
            .record_payment(admin, id, PaymentOutcome::Captured, "payme-100234".to_string())
            .await?;
        service.confirm(seller, id).await?;
        let assigned = service.accept(courier, id).await?;
        service.scan_pickup(courier, id, &pickup.token).await?;
        service.start_transit(courier, id).await?;
        let delivered = service
            .confirm_delivery(courier, id, None, assigned.order.delivery_code.clone())
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(delivered)
    }
    .instrument(span)
    .await?;

    info!(
        order_number = %record.order.order_number,
        status = %record.order.status,
        payment = %record.order.payment_status,
        "Order settled"
    );
    for entry in record.ledger.entries() {
        info!(
            kind = %entry.kind,
            amount = %entry.amount,
            currency = %entry.currency,
            status = %entry.status,
            "Ledger"
        );
    }
    let stock = system.product_client.check_stock(product_id).await?;
    info!(stock, "Stock after delivery");

    drop(service);
    system.shutdown().await?;
    info!("Demo complete");
    Ok(())
}

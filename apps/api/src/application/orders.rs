use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::order::{Order, OrderEvent, OrderItem, OrderStatus, PricingRules, ShippingAddress};
use crate::domain::repositories::{
    AddressRepository, CartRepository, OrderRepository, ProductRepository,
};

/// Checkout request: which saved address to ship to, plus optional notes
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub address_id: Uuid,
    pub notes: Option<String>,
}

/// Turns a user's cart into a `Pending` order with reserved inventory
pub struct CreateOrderUseCase<'a> {
    pub carts: &'a dyn CartRepository,
    pub addresses: &'a dyn AddressRepository,
    pub products: &'a dyn ProductRepository,
    pub orders: &'a dyn OrderRepository,
    pub pricing: &'a PricingRules,
}

impl CreateOrderUseCase<'_> {
    pub async fn execute(&self, user_id: Uuid, input: CreateOrderInput) -> DomainResult<Order> {
        let mut cart = self.carts.get(user_id).await?;
        if cart.is_empty() {
            return Err(DomainError::validation("Cart is empty"));
        }

        let address = self
            .addresses
            .find_by_id(input.address_id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| DomainError::not_found("Address", input.address_id))?;

        let ids: Vec<Uuid> = cart.items().iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, _> = self
            .products
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id(), p))
            .collect();

        let mut items = Vec::with_capacity(cart.items().len());
        for line in cart.items() {
            let product = products
                .get(&line.product_id)
                .filter(|p| p.is_active())
                .ok_or_else(|| DomainError::not_found("Product", line.product_id))?;
            items.push(OrderItem::new(
                product.id(),
                product.sku(),
                product.name().es.clone(),
                product.price(),
                line.quantity,
            ));
        }

        let (order, event) = Order::place(
            user_id,
            items,
            ShippingAddress::from(&address),
            input.notes,
            self.pricing,
        )?;

        // Lock order keeps concurrent checkouts from deadlocking on the same rows
        let mut lines = order.quantities();
        lines.sort_by_key(|(id, _)| *id);
        self.products.reserve(&lines).await?;

        if let Err(err) = self.orders.create(&order).await {
            tracing::error!(error = %err, user_id = %user_id, "Failed to save order, releasing reservation");
            if let Err(release_err) = self.products.release(&lines).await {
                tracing::error!(error = %release_err, "Failed to release reservation");
            }
            return Err(err);
        }

        cart.clear();
        if let Err(err) = self.carts.save(&cart).await {
            tracing::warn!(error = %err, order_id = %order.id(), "Order placed but cart was not cleared");
        }

        log_event(&event);
        Ok(order)
    }
}

/// Persists a status change, then applies its inventory side effect
///
/// | from → to           | inventory |
/// |---------------------|-----------|
/// | Pending → Paid      | commit    |
/// | Pending → Cancelled | release   |
/// | Paid → Cancelled    | restock   |
///
/// The status write is conditional on the stored status still being the one
/// read, so inventory moves at most once per transition. Losing that race is
/// a `Conflict`.
pub async fn change_order_status(
    orders: &dyn OrderRepository,
    products: &dyn ProductRepository,
    order: &mut Order,
    next: OrderStatus,
) -> DomainResult<OrderEvent> {
    let from = order.status();
    let event = order.transition_to(next)?;

    if !orders.transition(order, from).await? {
        return Err(DomainError::conflict(format!(
            "Order {} is no longer {}",
            order.reference(),
            from
        )));
    }

    let lines = order.quantities();
    let adjusted = match (from, next) {
        (OrderStatus::Pending, OrderStatus::Paid) => products.commit(&lines).await,
        (OrderStatus::Pending, OrderStatus::Cancelled) => products.release(&lines).await,
        (OrderStatus::Paid, OrderStatus::Cancelled) => products.restock(&lines).await,
        _ => Ok(()),
    };
    if let Err(err) = adjusted {
        tracing::error!(
            error = %err,
            order_id = %order.id(),
            from = %from,
            to = %next,
            "Order status saved but inventory was not adjusted"
        );
        return Err(err);
    }

    log_event(&event);
    Ok(event)
}

/// Cancels an order placed by `user_id`; only allowed while `Pending`
pub async fn cancel_own_order(
    orders: &dyn OrderRepository,
    products: &dyn ProductRepository,
    user_id: Uuid,
    order_id: Uuid,
) -> DomainResult<Order> {
    let mut order = orders
        .find_by_id(order_id)
        .await?
        .filter(|o| o.user_id() == user_id)
        .ok_or_else(|| DomainError::not_found("Order", order_id))?;

    if order.status() != OrderStatus::Pending {
        return Err(DomainError::conflict(format!(
            "Only pending orders can be cancelled (status: {})",
            order.status()
        )));
    }

    change_order_status(orders, products, &mut order, OrderStatus::Cancelled).await?;
    Ok(order)
}

fn log_event(event: &OrderEvent) {
    match event {
        OrderEvent::Placed {
            order_id,
            user_id,
            reference,
            total,
        } => tracing::info!(
            event = event.name(),
            order_id = %order_id,
            user_id = %user_id,
            reference = %reference,
            total = %total,
            "Order placed"
        ),
        OrderEvent::StatusChanged { order_id, from, to } => tracing::info!(
            event = event.name(),
            order_id = %order_id,
            from = %from,
            to = %to,
            "Order status changed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::Cart;
    use crate::domain::catalog::{LocalizedText, Product, ProductDraft};
    use crate::domain::user::{Address, NewAddress};
    use crate::infrastructure::repositories::{
        InMemoryAddressRepository, InMemoryCartRepository, InMemoryOrderRepository,
        InMemoryProductRepository,
    };
    use rust_decimal::Decimal;

    struct Fixture {
        carts: InMemoryCartRepository,
        addresses: InMemoryAddressRepository,
        products: InMemoryProductRepository,
        orders: InMemoryOrderRepository,
        pricing: PricingRules,
        user_id: Uuid,
        address_id: Uuid,
    }

    impl Fixture {
        async fn new() -> Self {
            let user_id = Uuid::new_v4();
            let addresses = InMemoryAddressRepository::new();
            let address = Address::new(
                user_id,
                NewAddress {
                    label: None,
                    recipient: "Camila Ríos".to_string(),
                    line1: "Carrera 7 # 45-10".to_string(),
                    line2: None,
                    city: "Bogotá".to_string(),
                    department: "Cundinamarca".to_string(),
                    postal_code: None,
                    phone: None,
                    is_default: true,
                },
            )
            .unwrap();
            addresses.create(&address).await.unwrap();

            Self {
                carts: InMemoryCartRepository::new(),
                addresses,
                products: InMemoryProductRepository::new(),
                orders: InMemoryOrderRepository::new(),
                pricing: PricingRules::default(),
                user_id,
                address_id: address.id,
            }
        }

        async fn product(&self, sku: &str, price: i64, stock: i32) -> Product {
            let product = Product::new(
                ProductDraft {
                    sku: sku.to_string(),
                    slug: None,
                    name: LocalizedText::new(format!("Café {}", sku), None),
                    description: LocalizedText::new("", None),
                    price: Decimal::new(price, 0),
                    compare_at_price: None,
                    category_id: None,
                    image_url: None,
                    is_active: true,
                    is_featured: false,
                },
                stock,
            )
            .unwrap();
            self.products.create(&product).await.unwrap();
            product
        }

        async fn fill_cart(&self, lines: &[(Uuid, i32)]) {
            let mut cart = Cart::new(self.user_id);
            for (id, qty) in lines {
                cart.add_item(*id, *qty).unwrap();
            }
            self.carts.save(&cart).await.unwrap();
        }

        fn use_case(&self) -> CreateOrderUseCase<'_> {
            CreateOrderUseCase {
                carts: &self.carts,
                addresses: &self.addresses,
                products: &self.products,
                orders: &self.orders,
                pricing: &self.pricing,
            }
        }

        fn input(&self) -> CreateOrderInput {
            CreateOrderInput {
                address_id: self.address_id,
                notes: None,
            }
        }
    }

    #[tokio::test]
    async fn checkout_reserves_stock_and_clears_cart() {
        let f = Fixture::new().await;
        let p = f.product("CAF-1", 30000, 10).await;
        f.fill_cart(&[(p.id(), 3)]).await;

        let order = f.use_case().execute(f.user_id, f.input()).await.unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.totals().subtotal, Decimal::new(90000, 0));
        assert_eq!(order.totals().shipping, Decimal::new(12000, 0));
        let stored = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!(stored.reserved(), 3);
        assert!(f.carts.get(f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_save_releases_reservation() {
        let f = Fixture::new().await;
        let p = f.product("CAF-2", 30000, 10).await;
        f.fill_cart(&[(p.id(), 4)]).await;
        f.orders.fail_next_create().await;

        let err = f.use_case().execute(f.user_id, f.input()).await.unwrap_err();

        assert!(matches!(err, DomainError::Storage(_)));
        let stored = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!(stored.reserved(), 0);
        assert!(!f.carts.get(f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insufficient_stock_reserves_nothing() {
        let f = Fixture::new().await;
        let a = f.product("CAF-3", 10000, 5).await;
        let b = f.product("CAF-4", 10000, 1).await;
        f.fill_cart(&[(a.id(), 2), (b.id(), 2)]).await;

        let err = f.use_case().execute(f.user_id, f.input()).await.unwrap_err();

        match err {
            DomainError::InsufficientStock { sku, requested, available } => {
                assert_eq!(sku, "CAF-4");
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        let a_after = f.products.find_by_id(a.id()).await.unwrap().unwrap();
        assert_eq!(a_after.reserved(), 0);
    }

    #[tokio::test]
    async fn foreign_address_is_not_found() {
        let f = Fixture::new().await;
        let p = f.product("CAF-5", 10000, 5).await;
        f.fill_cart(&[(p.id(), 1)]).await;

        let input = CreateOrderInput {
            address_id: Uuid::new_v4(),
            notes: None,
        };
        let err = f.use_case().execute(f.user_id, input).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Address", .. }));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let f = Fixture::new().await;
        let err = f.use_case().execute(f.user_id, f.input()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn cancelling_paid_order_restocks() {
        let f = Fixture::new().await;
        let p = f.product("CAF-6", 10000, 5).await;
        f.fill_cart(&[(p.id(), 2)]).await;
        let mut order = f.use_case().execute(f.user_id, f.input()).await.unwrap();

        change_order_status(&f.orders, &f.products, &mut order, OrderStatus::Paid)
            .await
            .unwrap();
        let paid = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!((paid.stock(), paid.reserved()), (3, 0));

        change_order_status(&f.orders, &f.products, &mut order, OrderStatus::Cancelled)
            .await
            .unwrap();
        let restocked = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!((restocked.stock(), restocked.reserved()), (5, 0));
    }

    #[tokio::test]
    async fn failed_status_write_leaves_inventory_untouched() {
        let f = Fixture::new().await;
        let p = f.product("CAF-8", 10000, 10).await;
        f.fill_cart(&[(p.id(), 2)]).await;
        let order = f.use_case().execute(f.user_id, f.input()).await.unwrap();
        f.orders.fail_next_transition().await;

        let mut first = order.clone();
        let err = change_order_status(&f.orders, &f.products, &mut first, OrderStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        let untouched = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!((untouched.stock(), untouched.reserved()), (10, 2));

        let mut retry = f.orders.find_by_id(order.id()).await.unwrap().unwrap();
        change_order_status(&f.orders, &f.products, &mut retry, OrderStatus::Paid)
            .await
            .unwrap();
        let sold = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!((sold.stock(), sold.reserved()), (8, 0));
    }

    #[tokio::test]
    async fn stale_order_copy_does_not_move_inventory_twice() {
        let f = Fixture::new().await;
        let p = f.product("CAF-9", 10000, 10).await;
        f.fill_cart(&[(p.id(), 2)]).await;
        let order = f.use_case().execute(f.user_id, f.input()).await.unwrap();

        let mut a = order.clone();
        let mut b = order.clone();
        change_order_status(&f.orders, &f.products, &mut a, OrderStatus::Paid)
            .await
            .unwrap();
        let err = change_order_status(&f.orders, &f.products, &mut b, OrderStatus::Paid)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        let stored = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!((stored.stock(), stored.reserved()), (8, 0));
    }

    #[tokio::test]
    async fn customer_cancel_requires_pending() {
        let f = Fixture::new().await;
        let p = f.product("CAF-7", 10000, 5).await;
        f.fill_cart(&[(p.id(), 1)]).await;
        let order = f.use_case().execute(f.user_id, f.input()).await.unwrap();

        let other_user = Uuid::new_v4();
        assert!(matches!(
            cancel_own_order(&f.orders, &f.products, other_user, order.id()).await,
            Err(DomainError::NotFound { .. })
        ));

        let cancelled = cancel_own_order(&f.orders, &f.products, f.user_id, order.id())
            .await
            .unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        let stored = f.products.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!(stored.reserved(), 0);

        assert!(matches!(
            cancel_own_order(&f.orders, &f.products, f.user_id, order.id()).await,
            Err(DomainError::Conflict(_))
        ));
    }
}

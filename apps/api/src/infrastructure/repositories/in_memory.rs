// In-memory repository adapters
// Back the router in tests and in database-less local runs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::catalog::{Category, Page, Product, ProductFilter, Slug};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::{Payment, PaymentMethod};
use crate::domain::repositories::{
    AddressRepository, CartRepository, CategoryRepository, OrderRepository, OrderStats,
    PaymentRepository, ProductRepository, StockLines, User, UserRepository,
};
use crate::domain::user::{Address, Email, UserRole};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> DomainResult<Uuid> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict("Email already registered"));
        }
        let id = user.id;
        users.insert(id, user);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::not_found("User", user.id))?;
        stored.full_name = user.full_name.clone();
        stored.phone = user.phone.clone();
        stored.role = user.role;
        stored.is_active = user.is_active;
        Ok(())
    }

    async fn count_by_role(&self, role: UserRole) -> DomainResult<u64> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role)
            .count() as u64)
    }

    async fn update_last_login(&self, _user_id: Uuid) -> DomainResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAddressRepository {
    addresses: RwLock<Vec<Address>>,
}

impl InMemoryAddressRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Address>> {
        let mut list: Vec<Address> = self
            .addresses
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(list)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Address>> {
        Ok(self
            .addresses
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(&self, address: &Address) -> DomainResult<()> {
        let mut addresses = self.addresses.write().await;
        if address.is_default {
            addresses
                .iter_mut()
                .filter(|a| a.user_id == address.user_id)
                .for_each(|a| a.is_default = false);
        }
        addresses.push(address.clone());
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let mut addresses = self.addresses.write().await;
        let before = addresses.len();
        addresses.retain(|a| !(a.id == id && a.user_id == user_id));
        if addresses.len() == before {
            return Err(DomainError::not_found("Address", id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> DomainResult<Vec<Category>> {
        let mut list: Vec<Category> = self.categories.read().await.values().cloned().collect();
        list.sort_by(|a, b| a.name.es.cmp(&b.name.es));
        Ok(list)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| &c.slug == slug)
            .cloned())
    }

    async fn create(&self, category: &Category) -> DomainResult<()> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.slug == category.slug) {
            return Err(DomainError::conflict(format!(
                "Category slug already exists: {}",
                category.slug
            )));
        }
        categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> DomainResult<()> {
        let mut categories = self.categories.write().await;
        if categories
            .values()
            .any(|c| c.slug == category.slug && c.id != category.id)
        {
            return Err(DomainError::conflict(format!(
                "Category slug already exists: {}",
                category.slug
            )));
        }
        match categories.get_mut(&category.id) {
            Some(stored) => {
                *stored = category.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("Category", category.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.categories
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Category", id))
    }
}

/// Products keyed by id; inventory operations hold the write lock for the
/// whole batch so reservations are all-or-nothing.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_unique(products: &HashMap<Uuid, Product>, product: &Product) -> DomainResult<()> {
    let clash = products.values().find(|p| {
        p.id() != product.id() && (p.sku() == product.sku() || p.slug() == product.slug())
    });
    match clash {
        Some(_) => Err(DomainError::conflict(format!(
            "SKU or slug already in use: {} / {}",
            product.sku(),
            product.slug()
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &Product) -> DomainResult<()> {
        let mut products = self.products.write().await;
        ensure_unique(&products, product)?;
        products.insert(product.id(), product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> DomainResult<()> {
        let mut products = self.products.write().await;
        ensure_unique(&products, product)?;
        let stored = products
            .get(&product.id())
            .ok_or_else(|| DomainError::not_found("Product", product.id()))?;

        let merged = Product::from_persistence(
            product.id(),
            product.sku().to_string(),
            product.slug().clone(),
            product.name().clone(),
            product.description().clone(),
            product.price(),
            product.compare_at_price(),
            product.category_id(),
            product.image_url().map(str::to_string),
            stored.stock(),
            stored.reserved(),
            product.is_active(),
            product.is_featured(),
            stored.created_at(),
            product.updated_at(),
        );
        products.insert(product.id(), merged);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Product>> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| p.slug() == slug)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> DomainResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn list(&self, filter: &ProductFilter, category_id: Option<Uuid>) -> DomainResult<Page<Product>> {
        let mut matching: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| category_id.map_or(true, |c| p.category_id() == Some(c)))
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then(a.id().cmp(&b.id()))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page as usize)
            .collect();

        Ok(Page {
            items,
            total,
            page: filter.page,
            per_page: filter.per_page,
        })
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.products
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.products.read().await.len() as u64)
    }

    async fn count_in_category(&self, category_id: Uuid) -> DomainResult<u64> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.category_id() == Some(category_id))
            .count() as u64)
    }

    async fn low_stock(&self, threshold: i32) -> DomainResult<Vec<Product>> {
        let mut list: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.is_active() && p.available() <= threshold)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            a.available()
                .cmp(&b.available())
                .then_with(|| a.sku().cmp(b.sku()))
        });
        Ok(list)
    }

    async fn set_stock(&self, id: Uuid, stock: i32) -> DomainResult<Product> {
        if stock < 0 {
            return Err(DomainError::validation("Stock cannot be negative"));
        }
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        product.set_stock(stock)?;
        Ok(product.clone())
    }

    async fn reserve(&self, lines: &StockLines) -> DomainResult<()> {
        let mut products = self.products.write().await;

        // Validate every line before touching any counter
        for (product_id, quantity) in lines {
            let product = products
                .get(product_id)
                .ok_or_else(|| DomainError::not_found("Product", product_id))?;
            if !product.is_active() || product.available() < *quantity {
                return Err(DomainError::InsufficientStock {
                    sku: product.sku().to_string(),
                    requested: *quantity,
                    available: if product.is_active() { product.available() } else { 0 },
                });
            }
        }

        for (product_id, quantity) in lines {
            if let Some(product) = products.get_mut(product_id) {
                product.reserve(*quantity)?;
            }
        }
        Ok(())
    }

    async fn release(&self, lines: &StockLines) -> DomainResult<()> {
        let mut products = self.products.write().await;
        for (product_id, quantity) in lines {
            if let Some(product) = products.get_mut(product_id) {
                product.release(*quantity);
            }
        }
        Ok(())
    }

    async fn commit(&self, lines: &StockLines) -> DomainResult<()> {
        let mut products = self.products.write().await;
        for (product_id, quantity) in lines {
            if let Some(product) = products.get_mut(product_id) {
                product.commit(*quantity);
            }
        }
        Ok(())
    }

    async fn restock(&self, lines: &StockLines) -> DomainResult<()> {
        let mut products = self.products.write().await;
        for (product_id, quantity) in lines {
            if let Some(product) = products.get_mut(product_id) {
                product.restock(*quantity);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<Uuid, Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get(&self, user_id: Uuid) -> DomainResult<Cart> {
        Ok(self
            .carts
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Cart::new(user_id)))
    }

    async fn save(&self, cart: &Cart) -> DomainResult<()> {
        self.carts.write().await.insert(cart.user_id(), cart.clone());
        Ok(())
    }
}

/// Order store; the `fail_next_*` switches let tests exercise failure paths
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
    fail_next_create: RwLock<bool>,
    fail_next_transition: RwLock<bool>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create` call fail with a storage error
    pub async fn fail_next_create(&self) {
        *self.fail_next_create.write().await = true;
    }

    /// Makes the next `transition` call fail with a storage error
    pub async fn fail_next_transition(&self) {
        *self.fail_next_transition.write().await = true;
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    orders
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> DomainResult<()> {
        {
            let mut fail = self.fail_next_create.write().await;
            if *fail {
                *fail = false;
                return Err(DomainError::Storage("simulated write failure".to_string()));
            }
        }
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(())
    }

    async fn transition(&self, order: &Order, from: OrderStatus) -> DomainResult<bool> {
        {
            let mut fail = self.fail_next_transition.write().await;
            if *fail {
                *fail = false;
                return Err(DomainError::Storage("simulated write failure".to_string()));
            }
        }
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id()) {
            Some(stored) if stored.status() == from => {
                *stored = order.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::not_found("Order", order.id())),
        }
    }

    async fn set_payment_method(&self, id: Uuid, method: PaymentMethod) -> DomainResult<()> {
        match self.orders.write().await.get_mut(&id) {
            Some(stored) => {
                stored.set_payment_method(method);
                Ok(())
            }
            None => Err(DomainError::not_found("Order", id)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn list(&self, status: Option<OrderStatus>) -> DomainResult<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| status.map_or(true, |s| o.status() == s))
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn stats(&self) -> DomainResult<OrderStats> {
        let orders = self.orders.read().await;
        Ok(OrderStats {
            total_orders: orders.len() as u64,
            pending_orders: orders
                .values()
                .filter(|o| o.status() == OrderStatus::Pending)
                .count() as u64,
            paid_revenue: orders
                .values()
                .filter(|o| o.status().is_paid())
                .map(|o| o.total())
                .sum(),
        })
    }
}

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<HashMap<Uuid, Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create(&self, payment: &Payment) -> DomainResult<()> {
        self.payments.write().await.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> DomainResult<()> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment.id) {
            Some(stored) => {
                *stored = payment.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("Payment", payment.id)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_by_provider_reference(
        &self,
        method: PaymentMethod,
        reference: &str,
    ) -> DomainResult<Option<Payment>> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|p| p.method == method && p.provider_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn list_for_order(&self, order_id: Uuid) -> DomainResult<Vec<Payment>> {
        let mut list: Vec<Payment> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{LocalizedText, ProductDraft};
    use rust_decimal::Decimal;

    fn product(sku: &str, stock: i32) -> Product {
        Product::new(
            ProductDraft {
                sku: sku.to_string(),
                slug: None,
                name: LocalizedText::new(format!("Producto {}", sku), None),
                description: LocalizedText::new("", None),
                price: Decimal::new(10000, 0),
                compare_at_price: None,
                category_id: None,
                image_url: None,
                is_active: true,
                is_featured: false,
            },
            stock,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reserve_is_all_or_nothing() {
        let repo = InMemoryProductRepository::new();
        let a = product("A-1", 5);
        let b = product("B-1", 1);
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();

        let err = repo
            .reserve(&[(a.id(), 2), (b.id(), 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));

        let a_after = repo.find_by_id(a.id()).await.unwrap().unwrap();
        assert_eq!(a_after.reserved(), 0);
    }

    #[tokio::test]
    async fn update_does_not_overwrite_inventory() {
        let repo = InMemoryProductRepository::new();
        let p = product("C-1", 5);
        repo.create(&p).await.unwrap();
        repo.reserve(&[(p.id(), 3)]).await.unwrap();

        // A stale copy read before the reservation
        repo.update(&p).await.unwrap();
        let stored = repo.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!(stored.reserved(), 3);
    }

    #[tokio::test]
    async fn duplicate_sku_conflicts() {
        let repo = InMemoryProductRepository::new();
        repo.create(&product("D-1", 1)).await.unwrap();
        let mut dup = product("D-1", 1);
        dup.update(ProductDraft {
            sku: "D-1".to_string(),
            slug: Some("otro".to_string()),
            name: LocalizedText::new("Otro", None),
            description: LocalizedText::new("", None),
            price: Decimal::new(5000, 0),
            compare_at_price: None,
            category_id: None,
            image_url: None,
            is_active: true,
            is_featured: false,
        })
        .unwrap();
        assert!(matches!(
            repo.create(&dup).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn new_default_address_clears_previous() {
        use crate::domain::user::NewAddress;

        let repo = InMemoryAddressRepository::new();
        let user_id = Uuid::new_v4();
        let input = |default| NewAddress {
            label: None,
            recipient: "Ana".to_string(),
            line1: "Calle 1".to_string(),
            line2: None,
            city: "Cali".to_string(),
            department: "Valle del Cauca".to_string(),
            postal_code: None,
            phone: None,
            is_default: default,
        };
        let first = Address::new(user_id, input(true)).unwrap();
        let second = Address::new(user_id, input(true)).unwrap();
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let list = repo.list_for_user(user_id).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert!(list[0].is_default);
        assert!(!list[1].is_default);
    }
}

//! OrdersManager - order creation and the status state machine
//!
//! # Creation
//!
//! ```text
//! create_order(customer, request)
//!     ├─ 1. Validate request shape
//!     ├─ 2. Resolve products (all of one seller)
//!     ├─ 3. Resolve declared seller (eligible, owns the products)
//!     ├─ 4. Price lines (strict variants)
//!     ├─ 5. Resolve seller position
//!     ├─ 6. Resolve delivery position (new or existing address)
//!     ├─ 7. Distance ≤ max radius, shipping = round(distance × rate)
//!     ├─ 8. Allocate order number, persist new delivery Location, then
//!     │     the order (pending); the Location is removed if the insert fails
//!     └─ 9. NEW_ORDER → seller stream
//! ```
//!
//! # Transition
//!
//! ```text
//! update_status(seller, order, next)
//!     ├─ 1. Load; missing or foreign order → OrderNotFound
//!     ├─ 2. Check the transition table
//!     ├─ 3. Compare-and-set in one write transaction
//!     └─ 4. ORDER_STATUS_UPDATE → customer stream + push (best effort)
//! ```

mod error;
pub use error::*;

use rust_decimal::Decimal;
use shared::message::{Audience, NotificationEvent};
use shared::models::{CreateOrderRequest, GeoPoint, Order, OrderStatus, StatusChange};
use shared::util::new_id;
use shared::{Page, Paginated};
use std::sync::Arc;
use validator::Validate;

use super::shipping::{DEFAULT_RATE_PER_KM, shipping_cost};
use crate::catalog::{CatalogAccessor, CatalogService};
use crate::geo::haversine_km;
use crate::locations::LocationService;
use crate::notifications::{NotificationHub, PushMessage, PushNotifier, dispatch_push};
use crate::pricing::CartPricer;
use crate::storage::{MarketStorage, OrderFilter, StorageError};

/// Push title for status updates
pub const PUSH_TITLE: &str = "Order update";

/// Delivery boundary and shipping rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderPolicy {
    /// Inclusive
    pub max_radius_km: f64,
    pub shipping_rate_per_km: u64,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            max_radius_km: 10.0,
            shipping_rate_per_km: DEFAULT_RATE_PER_KM,
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// The only component allowed to create orders and change their status
#[derive(Clone)]
pub struct OrdersManager {
    storage: MarketStorage,
    pricer: CartPricer,
    catalog: CatalogService,
    locations: LocationService,
    hub: NotificationHub,
    push: Arc<dyn PushNotifier>,
    policy: OrderPolicy,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &self.storage)
            .field("hub", &"<NotificationHub>")
            .field("push", &"<dyn PushNotifier>")
            .field("policy", &self.policy)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(
        storage: MarketStorage,
        pricer: CartPricer,
        catalog: CatalogService,
        locations: LocationService,
        hub: NotificationHub,
        push: Arc<dyn PushNotifier>,
        policy: OrderPolicy,
    ) -> Self {
        Self {
            storage,
            pricer,
            catalog,
            locations,
            hub,
            push,
            policy,
        }
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /// Place a single-seller order for `customer_id`
    pub fn create_order(
        &self,
        customer_id: &str,
        request: CreateOrderRequest,
        now: i64,
    ) -> ManagerResult<Order> {
        request
            .validate()
            .map_err(|e| ManagerError::Validation(e.to_string()))?;

        let products = self.pricer.order_products(&request.items)?;
        let seller = self.pricer.resolve_seller(&request.seller_id)?;
        let items = self
            .pricer
            .price_order_lines(&seller.id, &products, &request.items)?;

        let seller_point = self
            .locations
            .user_point(&seller)?
            .ok_or_else(|| ManagerError::SellerLocationMissing(seller.id.clone()))?;

        let (delivery_point, existing_address) = match (&request.location, &request.delivery_address_id) {
            (Some(input), _) => (input.point(), None),
            (None, Some(address_id)) => {
                let location = self.locations.get_location(address_id)?;
                (location.point(), Some(location.id))
            }
            (None, None) => return Err(ManagerError::DeliveryLocationRequired),
        };

        let distance_km = self.check_distance(seller_point, delivery_point)?;
        let shipping = shipping_cost(distance_km, self.policy.shipping_rate_per_km)
            .ok_or_else(|| ManagerError::Internal(format!("shipping cost for {} km", distance_km)))?;
        let items_total: Decimal = items.iter().map(|l| l.line_total).sum();

        let order_no = self.storage.next_order_no()?;
        let (delivery_location_id, created_location) = match (existing_address, &request.location) {
            (Some(id), _) => (id, false),
            (None, Some(input)) => (self.locations.create_location(input, now)?.id, true),
            (None, None) => return Err(ManagerError::DeliveryLocationRequired),
        };

        let order = Order {
            id: new_id(),
            order_no,
            customer_id: customer_id.to_string(),
            seller_id: seller.id.clone(),
            items,
            status: OrderStatus::Pending,
            delivery_location_id,
            receiver_name: request.receiver_name.unwrap_or_default(),
            receiver_phone: request.receiver_phone.unwrap_or_default(),
            note: request.note.unwrap_or_default(),
            distance: distance_km,
            shipping_cost: shipping,
            items_total,
            total_with_shipping: items_total + shipping,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        };
        if let Err(e) = self.storage.insert_order(&order) {
            if created_location {
                self.discard_location(&order.delivery_location_id);
            }
            return Err(e.into());
        }

        tracing::info!(
            order_id = %order.id,
            order_no = order.order_no,
            seller_id = %order.seller_id,
            distance_km,
            total = %order.total_with_shipping,
            "Order created"
        );

        self.hub
            .publish(Audience::Seller, &order.seller_id, NotificationEvent::new_order(&order));
        Ok(order)
    }

    /// Drop a delivery Location whose order was never stored
    fn discard_location(&self, location_id: &str) {
        if let Err(e) = self.locations.remove_location(location_id) {
            tracing::warn!(location_id, error = %e, "Failed to remove orphaned delivery location");
        }
    }

    /// Great-circle distance, rejected beyond the inclusive boundary
    fn check_distance(&self, seller: GeoPoint, delivery: GeoPoint) -> ManagerResult<f64> {
        if !delivery.is_valid() {
            return Err(ManagerError::Validation(format!(
                "invalid delivery coordinates: {}, {}",
                delivery.lat, delivery.lng
            )));
        }
        let distance_km = haversine_km(seller, delivery);
        if distance_km > self.policy.max_radius_km {
            return Err(ManagerError::OutOfServiceArea {
                distance_km,
                max_km: self.policy.max_radius_km,
            });
        }
        Ok(distance_km)
    }

    /// Seller-driven status transition
    ///
    /// Orders of other sellers are reported as not found.
    pub fn update_status(
        &self,
        seller_id: &str,
        order_id: &str,
        next: OrderStatus,
        now: i64,
    ) -> ManagerResult<StatusChange> {
        let order = self
            .storage
            .get_order(order_id)?
            .filter(|o| !o.is_deleted)
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))?;

        if order.seller_id != seller_id {
            crate::security_log!(
                "WARN",
                "order_ownership_violation",
                seller_id = seller_id,
                order_id = order_id
            );
            return Err(ManagerError::OrderNotFound(order_id.to_string()));
        }

        let previous = order.status;
        if !previous.can_transition_to(next) {
            return Err(ManagerError::InvalidTransition {
                from: previous,
                to: next,
            });
        }

        let updated = self
            .storage
            .compare_and_set_status(order_id, previous, next, now)
            .map_err(|e| match e {
                StorageError::StatusConflict { actual, .. } => ManagerError::InvalidTransition {
                    from: actual,
                    to: next,
                },
                StorageError::OrderNotFound(id) => ManagerError::OrderNotFound(id),
                other => ManagerError::Storage(other),
            })?;

        if next == OrderStatus::Completed {
            self.catalog.record_sales(&updated.items);
        }

        tracing::info!(order_id, from = %previous, to = %next, "Order status changed");
        self.notify_customer(&updated);

        Ok(StatusChange {
            message: next.message().to_string(),
            previous,
            order: updated,
        })
    }

    /// Stream + push, both best effort
    fn notify_customer(&self, order: &Order) {
        let event = NotificationEvent::status_update(&order.id, order.status);
        self.hub.publish(Audience::Customer, &order.customer_id, event);

        let token = self
            .catalog
            .get_user(&order.customer_id)
            .and_then(|u| u.expo_push_token);
        if let Some(token) = token {
            let message = PushMessage::new(
                token,
                PUSH_TITLE,
                order.status.message(),
                serde_json::json!({ "orderId": order.id, "status": order.status }),
            );
            dispatch_push(self.push.clone(), message);
        }
    }

    pub fn get_order(&self, order_id: &str) -> ManagerResult<Order> {
        self.storage
            .get_order(order_id)?
            .filter(|o| !o.is_deleted)
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }

    /// Newest first
    pub fn list_orders(&self, filter: &OrderFilter, page: Page) -> ManagerResult<Paginated<Order>> {
        let (orders, total) = self.storage.find_orders(filter, page.skip(), page.limit())?;
        Ok(Paginated::new(orders, total, page))
    }

    pub fn orders_of_customer(
        &self,
        customer_id: &str,
        status: Option<OrderStatus>,
        page: Page,
    ) -> ManagerResult<Paginated<Order>> {
        self.list_orders(&OrderFilter::for_customer(customer_id).with_status(status), page)
    }

    pub fn orders_of_seller(
        &self,
        seller_id: &str,
        status: Option<OrderStatus>,
        page: Page,
    ) -> ManagerResult<Paginated<Order>> {
        self.list_orders(&OrderFilter::for_seller(seller_id).with_status(status), page)
    }

    /// Flag-based delete (admin)
    pub fn delete_order(&self, order_id: &str, now: i64) -> ManagerResult<()> {
        self.get_order(order_id)?;
        self.storage.soft_delete_order(order_id, now)?;
        tracing::info!(order_id, "Order soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests;

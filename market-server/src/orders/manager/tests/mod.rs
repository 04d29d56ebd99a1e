use super::*;
use crate::catalog::CatalogService;
use crate::geo::SpatialIndex;
use crate::notifications::PushError;
use crate::pricing::PricingError;
use crate::test_support::{customer, product, seller};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{CartLineInput, LocationInput};

/// Seller s1 position (District 1, HCMC)
const SELLER: GeoPoint = GeoPoint {
    lat: 10.7769,
    lng: 106.7009,
};

#[derive(Default)]
struct RecordingPush {
    sent: Mutex<Vec<PushMessage>>,
}

#[async_trait]
impl PushNotifier for RecordingPush {
    async fn send(&self, message: PushMessage) -> Result<(), PushError> {
        self.sent.lock().push(message);
        Ok(())
    }
}

struct TestEnv {
    manager: OrdersManager,
    storage: MarketStorage,
    catalog: CatalogService,
    locations: LocationService,
    hub: NotificationHub,
    push: Arc<RecordingPush>,
}

fn create_test_env() -> TestEnv {
    create_test_env_with_policy(OrderPolicy::default())
}

fn create_test_env_with_policy(policy: OrderPolicy) -> TestEnv {
    let storage = MarketStorage::open_in_memory().unwrap();
    let catalog = CatalogService::new();
    let locations = LocationService::new(storage.clone(), catalog.clone(), Arc::new(SpatialIndex::new()));

    catalog.upsert_user(seller("s1", "Shop One"));
    catalog.upsert_user(seller("s2", "Shop Two"));
    let mut buyer = customer("c1");
    buyer.expo_push_token = Some("ExponentPushToken[c1]".into());
    catalog.upsert_user(buyer);

    catalog.upsert_product(product("p1", "s1", 20000));
    catalog.upsert_product(product("p2", "s1", 10000));
    catalog.upsert_product(product("q1", "s2", 15000));
    catalog.upsert_product(product("r1", "s3", 15000));

    for (id, point) in [("s1", SELLER), ("s2", GeoPoint::new(SELLER.lat, SELLER.lng + 0.01))] {
        locations
            .assign_user_location(id, &input_at(point), 0)
            .unwrap();
    }
    // s3 never gets a position
    let mut s3 = seller("s3", "No Address");
    s3.location_id = None;
    catalog.upsert_user(s3);

    let hub = NotificationHub::default();
    let push = Arc::new(RecordingPush::default());
    let manager = OrdersManager::new(
        storage.clone(),
        CartPricer::new(Arc::new(catalog.clone())),
        catalog.clone(),
        locations.clone(),
        hub.clone(),
        push.clone(),
        policy,
    );

    TestEnv {
        manager,
        storage,
        catalog,
        locations,
        hub,
        push,
    }
}

fn input_at(point: GeoPoint) -> LocationInput {
    LocationInput {
        latitude: point.lat,
        longitude: point.lng,
        address: Some("delivery".into()),
    }
}

fn line(product_id: &str, size: Option<&str>, toppings: &[&str], quantity: u32) -> CartLineInput {
    CartLineInput {
        product_id: product_id.into(),
        size_id: size.map(String::from),
        topping_ids: toppings.iter().map(|t| t.to_string()).collect(),
        quantity,
    }
}

/// Order request delivering `lat_offset` degrees north of the seller
fn order_request(seller_id: &str, items: Vec<CartLineInput>, lat_offset: f64) -> CreateOrderRequest {
    CreateOrderRequest {
        seller_id: seller_id.into(),
        items,
        location: Some(input_at(GeoPoint::new(SELLER.lat + lat_offset, SELLER.lng))),
        delivery_address_id: None,
        receiver_name: Some("Lan".into()),
        receiver_phone: Some("0900000000".into()),
        note: Some("ít đá".into()),
    }
}

/// Pending order from c1 to s1, ~1.1 km away
fn place_order(env: &TestEnv) -> Order {
    env.manager
        .create_order("c1", order_request("s1", vec![line("p1", None, &[], 1)], 0.01), 1)
        .unwrap()
}

/// Location rows in redb
fn stored_locations(env: &TestEnv) -> usize {
    use redb::{ReadableDatabase, ReadableTable};
    let txn = env.storage.db().begin_read().unwrap();
    let table = txn.open_table(crate::storage::LOCATIONS_TABLE).unwrap();
    table.iter().unwrap().count()
}

/// Allowed path from pending to `target`
fn path_to(target: OrderStatus) -> Vec<OrderStatus> {
    use OrderStatus::*;
    match target {
        Pending => vec![],
        Confirmed => vec![Confirmed],
        Preparing => vec![Confirmed, Preparing],
        Delivering => vec![Confirmed, Preparing, Delivering],
        Completed => vec![Confirmed, Preparing, Delivering, Completed],
        Cancelled => vec![Cancelled],
    }
}

fn advance(env: &TestEnv, order_id: &str, target: OrderStatus) {
    for (i, status) in path_to(target).into_iter().enumerate() {
        env.manager
            .update_status("s1", order_id, status, 10 + i as i64)
            .unwrap();
    }
}

mod test_transitions;

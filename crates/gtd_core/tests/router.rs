use gtd_core::router::{HashRouter, Route, ROUTE_CHANGE};
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(router: &HashRouter) -> (Rc<RefCell<Vec<Route>>>, gtd_core::router::Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = router.on_route_change(move |route| sink.borrow_mut().push(route.clone()));
    (seen, subscription)
}

#[test]
fn navigate_writes_fragment_and_poll_emits_once() {
    let router = HashRouter::new("");
    let (seen, _subscription) = recorder(&router);

    assert!(router.navigate("clarify", [("thingId", "42")]));
    assert_eq!(router.fragment(), "clarify?thingId=42");
    assert_eq!(router.current_route().path, "inbox");

    let route = router.poll().unwrap();
    assert_eq!(route.path, "clarify");
    assert_eq!(route.param("thingId"), Some("42"));
    assert_eq!(router.current_route(), route);
    assert_eq!(seen.borrow().len(), 1);

    assert!(router.poll().is_none());
    assert!(!router.navigate("clarify", [("thingId", "42")]));
    assert!(router.poll().is_none());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn parse_then_navigate_preserves_decoded_route() {
    let original = Route::parse("#review?note=a%20b%26c&empty&x=%EC%83%9D%EA%B0%81");
    assert_eq!(original.param("note"), Some("a b&c"));
    assert_eq!(original.param("empty"), Some(""));
    assert_eq!(original.param("x"), Some("생각"));

    let router = HashRouter::new("inbox");
    router.navigate_to(&original);
    let reparsed = router.poll().unwrap();
    assert_eq!(reparsed, original);
}

#[test]
fn registered_handler_runs_before_subscribers() {
    let router = HashRouter::new("inbox");
    let order = Rc::new(RefCell::new(Vec::new()));

    let handler_log = Rc::clone(&order);
    router.register("review", move |_| handler_log.borrow_mut().push("handler"));
    let subscriber_log = Rc::clone(&order);
    let _subscription = router.on(ROUTE_CHANGE, move |_| subscriber_log.borrow_mut().push("subscriber"));

    assert!(router.is_registered("review"));
    router.navigate("review", std::iter::empty::<(String, String)>());
    router.poll();
    assert_eq!(*order.borrow(), vec!["handler", "subscriber"]);
}

#[test]
fn disposed_subscription_stops_receiving() {
    let router = HashRouter::new("inbox");
    let (seen, subscription) = recorder(&router);

    router.set_hash("actions");
    router.poll();
    subscription.dispose();
    router.set_hash("projects");
    router.poll();

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(router.current_route().path, "projects");
}

#[test]
fn back_and_forward_are_observed_as_changes() {
    let router = HashRouter::new("inbox");
    let (seen, _subscription) = recorder(&router);

    router.navigate("actions", [("filter", "done")]);
    router.poll();
    router.navigate("review", std::iter::empty::<(String, String)>());
    router.poll();

    assert!(router.back());
    let route = router.poll().unwrap();
    assert_eq!(route.path, "actions");
    assert_eq!(route.param("filter"), Some("done"));

    assert!(router.forward());
    assert_eq!(router.poll().unwrap().path, "review");
    assert_eq!(seen.borrow().len(), 4);
}

#[test]
fn subscriber_may_navigate_reentrantly() {
    let router = Rc::new(HashRouter::new("inbox"));
    let inner = Rc::clone(&router);
    let _subscription = router.on_route_change(move |route| {
        if route.path == "nowhere" {
            inner.navigate("inbox", std::iter::empty::<(String, String)>());
        }
    });

    router.set_hash("nowhere");
    assert_eq!(router.poll().unwrap().path, "nowhere");
    assert_eq!(router.poll().unwrap().path, "inbox");
}

use fleetcore::fleet::{Route, Waypoint};
use fleetcore::geometry::{Bounds, Position};
use fleetcore::resolver::RouteResolver;
use fleetcore::validation::BoundsValidator;
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -200.0..200.0f64,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn instant() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => 0.0..2000.0f64,
        1 => Just(f64::NAN),
    ]
}

fn waypoint() -> impl Strategy<Value = Waypoint> {
    (any::<i64>(), coordinate(), coordinate(), instant(), instant())
        .prop_map(|(id, x, y, start, end)| Waypoint::new(id, Position::new(x, y), start, end))
}

fn route() -> impl Strategy<Value = Route> {
    prop::collection::vec(waypoint(), 0..12).prop_map(Route::new)
}

proptest! {
    #[test]
    fn resolved_positions_stay_in_bounds(
        route in route(),
        time in -100.0..2500.0f64,
        fallback in proptest::option::of((coordinate(), coordinate())),
    ) {
        let bounds = Bounds::default();
        let resolver = RouteResolver::new(BoundsValidator::new(bounds));
        let resolved = resolver.resolve(&route, time, fallback.map(Position::from));
        prop_assert!(bounds.contains_position(&resolved.position), "{:?}", resolved);
        prop_assert!((0.0..=1.0).contains(&resolved.progress));
        prop_assert!(resolved.is_moving || resolved.progress == 0.0);
    }

    #[test]
    fn validating_twice_changes_nothing(route in route()) {
        let validator = BoundsValidator::new(Bounds::new(-10.0, 10.0, -5.0, 5.0).unwrap());
        let once = validator.validate_route(&route);
        let twice = validator.validate_route(&once.route);
        prop_assert_eq!(&once.route, &twice.route);
        prop_assert!(twice.corrections.is_empty());
        prop_assert!(twice.window_repairs.is_empty());
        prop_assert_eq!(once.route.len(), route.len());
    }

    #[test]
    fn each_invalid_node_yields_one_correction(route in route()) {
        let bounds = Bounds::default();
        let validator = BoundsValidator::new(bounds);
        let invalid = route
            .iter()
            .filter(|stop| !bounds.contains_position(&stop.position))
            .count();
        prop_assert_eq!(validator.validate_route(&route).corrections.len(), invalid);
    }
}

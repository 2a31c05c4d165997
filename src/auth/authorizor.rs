use oso::{Oso, PolarClass};

use crate::auth::User;
use crate::entities::Trip;
use crate::error::Error;

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(User::get_polar_class())?;
    o.register_class(Trip::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[cfg(test)]
fn trip_for(user: &User) -> Trip {
    use crate::entities::NewTrip;
    use chrono::Utc;

    let now = Utc::now();
    let params = NewTrip {
        title: "Europe".into(),
        description: "".into(),
        image_url: None,
        start_date: now,
        end_date: now,
    };

    Trip::new(user.id, params).unwrap()
}

#[test]
fn trip_owner_role_test() {
    let authorizor = new().unwrap();

    let owner = User::new("owner@example.com".into(), None);
    let trip = trip_for(&owner);

    let result = authorizor.query_rule("has_role", (owner.clone(), "owner", trip.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    let result = authorizor.is_allowed(owner.clone(), "read", trip.clone());
    assert_eq!(result.unwrap(), true);

    let result = authorizor.is_allowed(owner.clone(), "add_location", trip.clone());
    assert_eq!(result.unwrap(), true);
}

#[test]
fn trip_stranger_test() {
    let authorizor = new().unwrap();

    let owner = User::new("owner@example.com".into(), None);
    let stranger = User::new("stranger@example.com".into(), None);
    let trip = trip_for(&owner);

    let result = authorizor.query_rule("has_role", (stranger.clone(), "owner", trip.clone()));
    assert!(result.unwrap().next().is_none());

    let result = authorizor.is_allowed(stranger.clone(), "read", trip.clone());
    assert_eq!(result.unwrap(), false);

    let result = authorizor.is_allowed(stranger.clone(), "add_location", trip.clone());
    assert_eq!(result.unwrap(), false);
}

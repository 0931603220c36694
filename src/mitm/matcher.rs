//! Joining forward and backward halves at their meeting city.

use super::half::{HalfRoute, Side};
use crate::model::{City, Graph, Solution};

#[derive(Debug, Default)]
struct MeetPlace {
    forward: Vec<HalfRoute>,
    backward: Vec<HalfRoute>,
}

/// Remembers every half route seen so far, grouped by meeting city.
#[derive(Debug)]
pub(crate) struct Matcher {
    size: usize,
    places: Vec<MeetPlace>,
}

impl Matcher {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            places: (0..size).map(|_| MeetPlace::default()).collect(),
        }
    }

    /// Records `half` and returns the cheapest full route it completes with
    /// a half from the other side, as a city sequence starting at home.
    pub fn add(&mut self, side: Side, half: HalfRoute) -> Option<Vec<City>> {
        let size = self.size;
        let place = self.places.get_mut(half.meet_city())?;
        let (own, other) = match side {
            Side::Forward => (&mut place.forward, &place.backward),
            Side::Backward => (&mut place.backward, &place.forward),
        };

        let partner = other
            .iter()
            .filter(|o| complements(&half, o, size))
            .min_by_key(|o| o.cost);
        let route = partner.map(|o| match side {
            Side::Forward => stitch(&half, o),
            Side::Backward => stitch(o, &half),
        });
        own.push(half);
        route
    }
}

/// Whether two halves meeting at the same city cover every city, sharing
/// only home and the meeting city.
pub(crate) fn complements(a: &HalfRoute, b: &HalfRoute, size: usize) -> bool {
    if a.visited.intersection(&b.visited).count() != 2 {
        return false;
    }
    a.visited.union(&b.visited).count() == size
}

/// The forward route followed by the backward route walked back, without
/// its meeting city and home.
fn stitch(forward: &HalfRoute, backward: &HalfRoute) -> Vec<City> {
    let mut route = forward.route.clone();
    let inner = &backward.route[1..backward.route.len() - 1];
    route.extend(inner.iter().rev());
    route
}

/// Turns a city sequence into a tour, taking the cheapest flight for every
/// leg. `None` when some leg has no flight.
pub(crate) fn to_solution(graph: &Graph, route: &[City]) -> Option<Solution> {
    let n = route.len();
    let flights = (0..n)
        .map(|day| graph.find(route[day], route[(day + 1) % n], day).copied())
        .collect::<Option<Vec<_>>>()?;
    Some(Solution::new(flights))
}

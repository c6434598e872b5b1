use crate::simulation::id::Id;
use crate::simulation::network::global_network::Link;

/// A vehicle as seen by the queue links. It only knows the remainder of its route, which is
/// what lanes need to decide where a vehicle lines up.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: Id<Vehicle>,
    pub pce: f64,
    pub max_v: f64,
    route: Vec<Id<Link>>,
    route_index: usize,
}

impl Vehicle {
    pub fn new(id: Id<Vehicle>, pce: f64, max_v: f64, route: Vec<Id<Link>>) -> Self {
        Vehicle {
            id,
            pce,
            max_v,
            route,
            route_index: 0,
        }
    }

    pub fn curr_link(&self) -> Option<&Id<Link>> {
        self.route.get(self.route_index)
    }

    pub fn next_link(&self) -> Option<&Id<Link>> {
        self.route.get(self.route_index + 1)
    }

    pub fn advance_route(&mut self) {
        self.route_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::id::Id;
    use crate::simulation::vehicles::Vehicle;

    #[test]
    fn route() {
        let mut vehicle = Vehicle::new(
            Id::create("veh"),
            1.,
            10.,
            vec![Id::create("1"), Id::create("2")],
        );
        assert_eq!("1", vehicle.curr_link().unwrap().external());
        assert_eq!("2", vehicle.next_link().unwrap().external());

        vehicle.advance_route();
        assert_eq!("2", vehicle.curr_link().unwrap().external());
        assert!(vehicle.next_link().is_none());
    }
}

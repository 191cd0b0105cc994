#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::HashSet;
    use std::num::NonZero;

    use crate::builder::ChipBuilder;
    use crate::chip::Chip;
    use crate::location::Location;

    /// A 7x7 chip: a 3x3 block of interior valves `1`..`9` (row-major from `(2, 2)`),
    /// reservoirs `A` (left), `B` (right), `C` (top), `D` (bottom), each bridged by perimeter valve `P<name>`.
    /// Every other cell is a wall.
    ///
    /// ```text
    /// ###R###
    /// ###P###
    /// ##ooo##
    /// RPoooPR
    /// ##ooo##
    /// ###P###
    /// ###R###
    /// ```
    pub(crate) fn cross_builder() -> ChipBuilder {
        let mut builder = ChipBuilder::with_dims((NonZero::new(7).unwrap(), NonZero::new(7).unwrap()));
        let mut named = HashSet::new();

        for (name, reservoir, perimeter) in [
            ("A", Location(0, 3), Location(1, 3)),
            ("B", Location(6, 3), Location(5, 3)),
            ("C", Location(3, 0), Location(3, 1)),
            ("D", Location(3, 6), Location(3, 5)),
        ] {
            builder.add_reservoir(name, reservoir)
                .add_perimeter_valve(format!("P{name}"), perimeter);
            named.extend([reservoir, perimeter]);
        }

        let mut number = 1;
        for y in 2..=4 {
            for x in 2..=4 {
                builder.add_valve(number.to_string(), Location(x, y));
                named.insert(Location(x, y));
                number += 1;
            }
        }

        for y in 0..7 {
            for x in 0..7 {
                if !named.contains(&Location(x, y)) {
                    builder.add_wall(Location(x, y));
                }
            }
        }

        builder
    }

    pub(crate) fn cross() -> Chip {
        cross_builder().build().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;

    use crate::actuation::{ActuationOp, Plan};
    use crate::allocation::claim_chain;
    use crate::builder::{BuilderInvalidReason, ChipBuilder};
    use crate::cell::Position;
    use crate::chip::Chip;
    use crate::closing::{first_stranded, validate_closing_order};
    use crate::error::RoutingError;
    use crate::location::Location;
    use crate::request::RoutingRequest;
    use crate::router::Router;
    use crate::search::{dijkstra, reconstruct_path, shortest_path};
    use crate::session::{GridView, Session};
    use crate::tests::fixtures::{cross, cross_builder};

    /// Valves opened after the output bridge and before the first close.
    fn stitched<'p>(plan: &'p Plan, output_bridge: &str) -> Vec<&'p str> {
        plan.ops.iter()
            .skip_while(|op| **op != ActuationOp::Open(output_bridge.to_owned()))
            .skip(1)
            .take_while(|op| !matches!(op, ActuationOp::Close(_)))
            .filter_map(|op| match op {
                ActuationOp::Open(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    fn assert_open_valves_connected(chip: &Chip, session: &Session, output_bridge: Location) {
        let view = GridView::new(chip, session);
        let open = session.open_valves();
        let mut reached = HashSet::from([output_bridge]);
        let mut frontier = vec![output_bridge];

        while let Some(current) = frontier.pop() {
            for next in view.neighbors(current) {
                if open.contains(&next) && reached.insert(next) {
                    frontier.push(next);
                }
            }
        }

        for valve in open {
            assert!(reached.contains(&valve), "{valve} is cut off from the output");
        }
    }

    #[test]
    fn edge_features_connect_along_one_axis() {
        let chip = cross();
        let session = Session::default();
        let view = GridView::new(&chip, &session);

        assert_eq!(view.neighbors(Location(0, 3)), vec![Location(1, 3)]);
        assert_eq!(view.neighbors(Location(1, 3)), vec![Location(0, 3), Location(2, 3)]);
        assert_eq!(view.neighbors(Location(3, 1)), vec![Location(3, 2), Location(3, 0)]);
        assert_eq!(view.neighbors(Location(5, 3)), vec![Location(4, 3), Location(6, 3)]);
        // interior valves see the perimeter valve beside them
        assert_eq!(view.neighbors(Location(2, 3)), vec![Location(3, 3), Location(2, 2), Location(1, 3), Location(2, 4)]);
    }

    #[test]
    fn lookup_and_blocking() {
        let chip = cross();
        assert_eq!(chip.lookup_position("A"), Some(Position::Reservoir(Location(0, 3))));
        assert_eq!(chip.lookup_position("PA"), Some(Position::PerimeterValve(Location(1, 3))));
        assert_eq!(chip.lookup_position("5"), Some(Position::InteriorValve(Location(3, 3))));
        assert_eq!(chip.lookup_position("nope"), None);

        let mut session = Session::default();
        session.block_valves(&chip, ["5", "PA", "A", "nope"]);
        assert_eq!(session.blocked_valves, HashSet::from([Location(3, 3)]));
        assert_eq!(session.blocked_perimeter, HashSet::from([Location(1, 3)]));

        let view = GridView::new(&chip, &session);
        assert!(view.passable(Location(0, 3)));
        assert!(!view.passable(Location(3, 3)));
        assert!(!view.passable(Location(0, 0)));
        assert_eq!(view.neighbors(Location(2, 3)), vec![Location(2, 2), Location(2, 4)]);

        // blocking again replaces rather than accumulates
        session.block_valves(&chip, ["9"]);
        assert_eq!(session.blocked_valves, HashSet::from([Location(4, 4)]));
        assert!(session.blocked_perimeter.is_empty());
    }

    #[test]
    fn builder_invalid_reasons() {
        let dims = (NonZero::new(3).unwrap(), NonZero::new(3).unwrap());

        let mut builder = ChipBuilder::with_dims(dims);
        builder.add_valve("1", Location(3, 0)).add_valve("2", Location(0, 0));
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::FeatureOutOfBounds(Location(3, 0))]));

        let mut builder = ChipBuilder::with_dims(dims);
        builder.add_valve("1", Location(0, 0)).add_reservoir("1", Location(1, 0));
        assert_eq!(builder.build().err(), Some(&vec![BuilderInvalidReason::DuplicateName("1".into())]));

        let mut builder = ChipBuilder::with_dims(dims);
        builder.add_wall(Location(1, 1)).add_valve("1", Location(1, 1));
        assert_eq!(builder.build().err(), Some(&vec![BuilderInvalidReason::OverlappingFeature(Location(1, 1))]));
    }

    #[test]
    fn render_overlays_session() {
        let chip = cross();
        assert_eq!(format!("{}", chip), "###R###
###P###
##ooo##
RPoooPR
##ooo##
###P###
###R###
");

        let mut session = Session::default();
        session.block_valves(&chip, ["5"]);
        session.claim([Location(2, 3)]);
        assert_eq!(chip.render(&session).lines().nth(3), Some("RP@XoPR"));
    }

    #[test]
    fn rename_reservoir() {
        let mut chip = cross();
        assert!(chip.rename_reservoir("A", "WATER"));
        assert!(!chip.rename_reservoir("PA", "X"));
        assert!(!chip.rename_reservoir("B", "WATER"));
        assert_eq!(chip.lookup_position("A"), None);
        assert_eq!(chip.name_of(Location(0, 3)), Some("WATER"));

        let plan = Router::new(&chip)
            .plan(&mut Session::default(), &RoutingRequest::new("B").input("WATER", 1))
            .unwrap();
        assert_eq!(plan.opened().collect::<Vec<_>>(), vec!["PA", "4", "PB", "6", "5"]);
    }

    #[test]
    fn dijkstra_straight_and_weighted() {
        let chip = cross();
        let session = Session::default();
        let view = GridView::new(&chip, &session);

        let came_from = dijkstra(&view, Location(2, 3), Location(4, 3));
        assert_eq!(came_from.get(&Location(2, 3)), Some(&None));
        assert_eq!(reconstruct_path(&came_from, Location(2, 3), Location(4, 3)),
                   Some(vec![Location(2, 3), Location(3, 3), Location(4, 3)]));

        let mut builder = cross_builder();
        builder.set_weight(Location(3, 3), 10);
        let heavy = builder.build().unwrap();
        let view = GridView::new(&heavy, &session);
        let path = shortest_path(&view, Location(2, 3), Location(4, 3)).unwrap();
        assert_eq!(path.len(), 5);
        assert!(!path.contains(&Location(3, 3)));
        assert!(path.windows(2).all(|pair| pair[0].touches(pair[1])));
    }

    #[test]
    fn unreachable_goal() {
        let chip = cross();
        let mut session = Session::default();
        session.block_valves(&chip, ["6"]);
        let view = GridView::new(&chip, &session);

        assert!(!dijkstra(&view, Location(6, 3), Location(2, 3)).contains_key(&Location(2, 3)));
        assert_eq!(shortest_path(&view, Location(6, 3), Location(2, 3)),
                   Err(RoutingError::PathNotFound { from: Location(6, 3), to: Location(2, 3) }));
    }

    #[test]
    fn chain_walks_towards_goal() {
        let chip = cross();
        let session = Session::default();
        let view = GridView::new(&chip, &session);

        assert_eq!(claim_chain(&view, "A", Location(1, 3), Location(6, 3), 3).unwrap(),
                   vec![Location(2, 3), Location(3, 3), Location(4, 3)]);
    }

    #[test]
    fn chain_jumps_at_dead_end() {
        let chip = cross();
        let mut session = Session::default();
        session.block_valves(&chip, ["4"]);
        let view = GridView::new(&chip, &session);

        assert_eq!(claim_chain(&view, "A", Location(1, 3), Location(6, 3), 2).unwrap(),
                   vec![Location(2, 2), Location(3, 2)]);
    }

    #[test]
    fn chain_runs_out_of_valves() {
        let chip = cross();
        let mut session = Session::default();
        session.block_valves(&chip, ["1", "2", "3", "4", "6", "7", "8", "9"]);
        let view = GridView::new(&chip, &session);

        assert_eq!(claim_chain(&view, "A", Location(1, 3), Location(6, 3), 2),
                   Err(RoutingError::InsufficientValves { input: "A".into(), requested: 2, claimed: 1 }));
    }

    #[test]
    fn closing_order_already_safe() {
        let chip = cross();
        let session = Session::default();
        let view = GridView::new(&chip, &session);

        let line = vec![Location(2, 3), Location(3, 3), Location(4, 3)];
        assert_eq!(validate_closing_order(&view, line.clone()).unwrap(), line);
    }

    #[test]
    fn closing_order_repaired_by_swap() {
        let chip = cross();
        let session = Session::default();
        let view = GridView::new(&chip, &session);

        let repaired = validate_closing_order(&view, vec![Location(3, 2), Location(2, 2), Location(4, 2)]).unwrap();
        assert_eq!(repaired, vec![Location(2, 2), Location(3, 2), Location(4, 2)]);
        assert_eq!(first_stranded(&view, &repaired), None);
    }

    #[test]
    fn closing_order_unclosable() {
        let chip = cross();
        let session = Session::default();
        let view = GridView::new(&chip, &session);

        assert_eq!(validate_closing_order(&view, vec![Location(2, 2), Location(4, 4), Location(3, 2)]),
                   Err(RoutingError::UnclosableSequence { swaps: 9 }));
    }

    #[test]
    fn single_input_closes_in_reverse() {
        let chip = cross();
        let mut session = Session::default();
        let plan = Router::new(&chip)
            .plan(&mut session, &RoutingRequest::new("B").input("A", 3).describe("flush"))
            .unwrap();

        assert_eq!(plan.description, "flush");
        assert_eq!(format!("{}", plan), "oPA,w300,o4,w300,o5,w300,o6,w300,cPA,w300,\
oPB,w300,\
c6,w300,c5,w300,c4,w300,cPB,w300");
        assert_eq!(plan.closed().collect::<Vec<_>>(), vec!["6", "5", "4", "PB"]);
        assert_eq!(session.open_valves(), vec![Location(2, 3), Location(3, 3), Location(4, 3)]);
    }

    #[test]
    fn two_inputs_join_nearest_first() {
        let chip = cross();
        let mut session = Session::default();
        let request = RoutingRequest::new("B").input("A", 2).input("C", 1).wait(50);
        let plan = Router::new(&chip).plan(&mut session, &request).unwrap();

        // C asks for fewer valves so it is allocated and emitted first; A's chain is nearest the output.
        // In reversed opening order 4 would be left touching only 2, so it closes before 5 instead.
        assert_eq!(format!("{}", plan), "oPC,w50,o2,w50,cPC,w50,\
oPA,w50,o4,w50,o5,w50,cPA,w50,\
oPB,w50,o6,w50,\
c6,w50,c4,w50,c5,w50,c2,w50,cPB,w50");
        assert_eq!(plan.total_wait_ms(), 50 * 13);
    }

    #[test]
    fn jumped_chain_is_stitched() {
        let chip = cross();
        let mut session = Session::default();
        let request = RoutingRequest::new("B").input("A", 2).avoid(["4"]);
        let plan = Router::new(&chip).plan(&mut session, &request).unwrap();

        assert_eq!(format!("{}", plan), "oPA,w300,o1,w300,o2,w300,cPA,w300,\
oPB,w300,o6,w300,o5,w300,\
c6,w300,c5,w300,c2,w300,c1,w300,cPB,w300");
        assert_open_valves_connected(&chip, &session, Location(5, 3));
    }

    #[test]
    fn stitch_crosses_open_valves() {
        let mut builder = cross_builder();
        builder.set_weight(Location(2, 2), 10);
        let chip = builder.build().unwrap();
        let mut session = Session::default();
        let request = RoutingRequest::new("D").input("A", 1).input("B", 1).avoid(["5"]);
        let plan = Router::new(&chip).plan(&mut session, &request).unwrap();

        // B joins A along the bottom row through the already open 7 and 8, so only 9 is new
        assert_eq!(format!("{}", plan), "oPA,w300,o4,w300,cPA,w300,\
oPB,w300,o6,w300,cPB,w300,\
oPD,w300,o8,w300,o7,w300,o9,w300,\
c6,w300,c9,w300,c8,w300,c7,w300,c4,w300,cPD,w300");
        assert_eq!(stitched(&plan, "PD"), vec!["8", "7", "9"]);
        assert_open_valves_connected(&chip, &session, Location(3, 5));
    }

    #[test]
    fn plan_properties_hold() {
        let chip = cross();
        let request = RoutingRequest::new("D").input("A", 2).input("C", 2).input("B", 1);
        let router = Router::new(&chip);

        let mut session = Session::default();
        let plan = router.plan(&mut session, &request).unwrap();

        // no double open
        let mut open = HashSet::new();
        for op in &plan.ops {
            match op {
                ActuationOp::Open(name) => assert!(open.insert(name.clone()), "{name} opened twice"),
                ActuationOp::Close(name) => assert!(open.remove(name), "{name} closed while shut"),
                ActuationOp::Wait(ms) => assert_eq!(*ms, 300),
            }
        }
        assert!(open.is_empty());

        // conservation: every interior open is either requested or stitched, and every one is claimed
        let interior = plan.opened()
            .filter(|name| matches!(chip.lookup_position(name), Some(Position::InteriorValve(_))))
            .count();
        assert_eq!(interior, request.requested_valves() + stitched(&plan, "PD").len());
        assert_eq!(interior, session.open_valves().len());

        // adjacency: everything opened reaches the output bridge through open valves
        assert_open_valves_connected(&chip, &session, Location(3, 5));

        // closing safety
        let view = GridView::new(&chip, &session);
        let closing = plan.closed()
            .filter_map(|name| match chip.lookup_position(name) {
                Some(Position::InteriorValve(location)) => Some(location),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(first_stranded(&view, &closing), None);

        // determinism
        let again = router.plan(&mut Session::default(), &request).unwrap();
        assert_eq!(plan, again);
    }

    #[test]
    fn over_allocation_emits_nothing() {
        let chip = cross();
        let router = Router::new(&chip);
        let mut session = Session::default();

        assert_eq!(router.plan(&mut session, &RoutingRequest::new("B").input("A", 10)),
                   Err(RoutingError::OverAllocated { requested: 10, available: 9 }));
        assert!(session.open_valves().is_empty());

        assert_eq!(router.plan(&mut session, &RoutingRequest::new("B").input("A", 5).input("C", 4).avoid(["5"])),
                   Err(RoutingError::OverAllocated { requested: 9, available: 8 }));
    }

    #[test]
    fn blocked_entry_leaves_input_without_valves() {
        let chip = cross();
        let request = RoutingRequest::new("B").input("A", 2).avoid(["PA"]);

        assert_eq!(Router::new(&chip).plan(&mut Session::default(), &request),
                   Err(RoutingError::InsufficientValves { input: "A".into(), requested: 2, claimed: 0 }));
    }

    #[test]
    fn unreachable_output() {
        let chip = cross();
        let mut session = Session::default();
        let request = RoutingRequest::new("B").input("A", 1).avoid(["6"]);

        assert_eq!(Router::new(&chip).plan(&mut session, &request),
                   Err(RoutingError::PathNotFound { from: Location(6, 3), to: Location(2, 3) }));
        // failures leave the session for the caller to reset
        assert_eq!(session.open_valves(), vec![Location(2, 3)]);
        session.reset();
        assert_eq!(session, Session::default());
    }

    #[test]
    fn request_shape_errors() {
        let chip = cross();
        let router = Router::new(&chip);
        let mut session = Session::default();

        assert_eq!(router.plan(&mut session, &RoutingRequest::new("B").input("B", 1)),
                   Err(RoutingError::SameInputOutput("B".into())));
        assert_eq!(router.plan(&mut session, &RoutingRequest::new("Z").input("A", 1)),
                   Err(RoutingError::UnknownOutput("Z".into())));
        assert_eq!(router.plan(&mut session, &RoutingRequest::new("B").input("Q", 1)),
                   Err(RoutingError::UnknownInput("Q".into())));
        assert_eq!(router.plan(&mut session, &RoutingRequest::new("B").input("A", 0)),
                   Err(RoutingError::EmptyDemand("A".into())));
        assert_eq!(router.plan(&mut session, &RoutingRequest::new("B")),
                   Err(RoutingError::NoInputs));
        assert_eq!(router.plan(&mut session, &RoutingRequest::new("B").input("5", 1)),
                   Err(RoutingError::UnbridgedEndpoint("5".into())));
    }

    #[test]
    fn pause_only_request() {
        let chip = cross();
        let plan = Router::new(&chip)
            .plan(&mut Session::default(), &RoutingRequest::new("").wait(1000))
            .unwrap();
        assert_eq!(plan.ops, vec![ActuationOp::Wait(1000)]);
    }
}

//! Multi-input routing: allocate a chain of valves per input, stitch every chain to the output,
//! and emit one conflict-free open/close sequence.

use itertools::Itertools;
use tracing::{debug, info};

use crate::actuation::{ActuationOp, Plan};
use crate::allocation::claim_chain;
use crate::cell::{Position, Site};
use crate::chip::Chip;
use crate::closing::validate_closing_order;
use crate::error::{RoutingError, RoutingResult};
use crate::location::Location;
use crate::request::{InputDemand, RoutingRequest};
use crate::search::shortest_path;
use crate::session::{GridView, Session};

/// An input's claimed valves, before it is connected to anything.
#[derive(Clone, Debug)]
struct Group<'r> {
    name: &'r str,
    bridge: Location,
    chain: Vec<Location>,
}

/// The growing structure already connected to the output.
#[derive(Debug, Default)]
struct Stitching {
    /// Every cell known to reach the output, in the order it joined.
    connected: Vec<Location>,
    /// Valves opened only to connect groups, in opening order.
    contact: Vec<Location>,
}

/// Plans valve actuation sequences on one [`Chip`].
///
/// Use [`Self::plan`] once per request; requests against the same [`Session`] must not overlap.
pub struct Router<'a> {
    chip: &'a Chip,
}

impl<'a> From<&'a Chip> for Router<'a> {
    fn from(chip: &'a Chip) -> Self {
        Self { chip }
    }
}

impl<'a> Router<'a> {
    /// Build a router over `chip`.
    pub fn new(chip: &'a Chip) -> Self {
        Self::from(chip)
    }

    /// Turn `request` into a totally ordered sequence of [`ActuationOp`]s.
    ///
    /// The session is reset and the request's exclusions applied before anything else; on success it holds every
    /// valve the plan opens. On failure nothing is emitted and the session is left as the failure found it.
    ///
    /// # Sequence
    /// 1. Each input, in ascending order of requested valves, is bracketed by its perimeter valve and opens its chain.
    /// 2. The output's perimeter valve opens, then every valve needed to stitch the chains to the output.
    /// 3. Every interior valve closes in the reverse of its opening order, repaired where needed so that no close
    ///    strands an open segment, and the output's perimeter valve closes last.
    ///
    /// Every open and close is followed by a wait of the request's duration.
    pub fn plan(&self, session: &mut Session, request: &RoutingRequest) -> RoutingResult<Plan> {
        session.reset();
        session.block_valves(self.chip, &request.avoid);

        if request.inputs.is_empty() && request.output.is_empty() {
            debug!("no inputs and no output, pausing only");
            return Ok(Plan {
                description: request.description.clone(),
                ops: vec![ActuationOp::Wait(request.wait_ms)],
            });
        }

        let (output, inputs) = self.validate(session, request)?;

        let mut groups = Vec::with_capacity(inputs.len());
        for demand in inputs {
            let group = self.allocate(session, demand, output.location())?;
            session.claim(group.chain.iter().copied());
            groups.push(group);
        }

        let stitching = self.stitch(session, output.location(), groups.clone())?;
        let view = GridView::new(self.chip, session);
        let output_bridge = self.bridge_of(&view, &request.output, output)
            .ok_or_else(|| RoutingError::UnbridgedEndpoint(request.output.clone()))??;

        // closes start from the reverse of the opens
        let opened = groups.iter()
            .flat_map(|group| group.chain.iter().copied())
            .chain(stitching.contact.iter().copied())
            .collect_vec();
        let closing = validate_closing_order(&view, opened.into_iter().rev().collect_vec())?;

        let mut emitter = Emitter { chip: self.chip, wait: request.wait_ms, ops: Vec::new() };
        for group in &groups {
            emitter.open(group.bridge);
            group.chain.iter().for_each(|valve| emitter.open(*valve));
            emitter.close(group.bridge);
        }
        emitter.open(output_bridge);
        stitching.contact.iter().for_each(|valve| emitter.open(*valve));
        closing.iter().for_each(|valve| emitter.close(*valve));
        emitter.close(output_bridge);

        info!(output = %request.output, inputs = groups.len(), ops = emitter.ops.len(), "plan finalized");
        Ok(Plan {
            description: request.description.clone(),
            ops: emitter.ops,
        })
    }

    /// Check the request shape against the chip; return the output and the inputs in processing order.
    fn validate<'r>(&self, session: &Session, request: &'r RoutingRequest) -> RoutingResult<(Position, Vec<&'r InputDemand>)> {
        if request.inputs.is_empty() {
            return Err(RoutingError::NoInputs);
        }

        if request.inputs.iter().any(|demand| demand.name == request.output) {
            return Err(RoutingError::SameInputOutput(request.output.clone()));
        }

        let output = self.chip.lookup_position(&request.output)
            .ok_or_else(|| RoutingError::UnknownOutput(request.output.clone()))?;

        for demand in &request.inputs {
            if self.chip.lookup_position(&demand.name).is_none() {
                return Err(RoutingError::UnknownInput(demand.name.clone()));
            }
            if demand.valves == 0 {
                return Err(RoutingError::EmptyDemand(demand.name.clone()));
            }
        }

        let requested = request.requested_valves();
        let available = self.chip.interior_valve_count() - session.blocked_valves.len();
        if requested > available {
            return Err(RoutingError::OverAllocated { requested, available });
        }

        // stable, so equal demands keep request order
        Ok((output, request.inputs.iter().sorted_by_key(|demand| demand.valves).collect_vec()))
    }

    /// The perimeter valve an endpoint's flow passes through.
    ///
    /// Returns `None` when nothing passable touches a reservoir, and an error when what touches it is not a perimeter valve.
    fn bridge_of(&self, view: &GridView<'_>, name: &str, position: Position) -> Option<RoutingResult<Location>> {
        match position {
            Position::Reservoir(location) => view.neighbors(location).first().map(|bridge| {
                match self.chip.site(*bridge) {
                    Site::PerimeterValve => Ok(*bridge),
                    _ => Err(RoutingError::UnbridgedEndpoint(name.to_owned())),
                }
            }),
            Position::PerimeterValve(location) => view.passable(location).then_some(Ok(location)),
            Position::InteriorValve(_) => Some(Err(RoutingError::UnbridgedEndpoint(name.to_owned()))),
        }
    }

    fn allocate<'r>(&self, session: &Session, demand: &'r InputDemand, goal: Location) -> RoutingResult<Group<'r>> {
        let view = GridView::new(self.chip, session);
        let position = self.chip.lookup_position(&demand.name)
            .ok_or_else(|| RoutingError::UnknownInput(demand.name.clone()))?;

        let bridge = self.bridge_of(&view, &demand.name, position)
            .ok_or_else(|| RoutingError::InsufficientValves {
                input: demand.name.clone(),
                requested: demand.valves,
                claimed: 0,
            })??;

        let chain = claim_chain(&view, &demand.name, bridge, goal, demand.valves)?;
        Ok(Group { name: &demand.name, bridge, chain })
    }

    /// Connect every group to the output, nearest first.
    fn stitch(&self, session: &mut Session, output: Location, mut pending: Vec<Group<'_>>) -> RoutingResult<Stitching> {
        let mut stitching = Stitching::default();

        // the first group joins the output directly
        let (index, target) = pending.iter()
            .enumerate()
            .flat_map(|(index, group)| group.chain.iter().map(move |cell| (index, *cell)))
            .min_by_key(|(_, cell)| cell.manhattan(output))
            .ok_or(RoutingError::NoInputs)?;
        let group = pending.remove(index);
        self.connect(session, &mut stitching, output, target, group)?;

        while !pending.is_empty() {
            let (anchor, index, target) = stitching.connected.iter()
                .cartesian_product(pending.iter().enumerate())
                .flat_map(|(anchor, (index, group))| group.chain.iter().map(move |cell| (*anchor, index, *cell)))
                .min_by_key(|(anchor, _, cell)| anchor.manhattan(*cell))
                .ok_or(RoutingError::NoInputs)?;
            let group = pending.remove(index);
            self.connect(session, &mut stitching, anchor, target, group)?;
        }

        Ok(stitching)
    }

    /// Open a shortest path from `anchor` to `target`, then fold `group` into the connected structure.
    fn connect(
        &self,
        session: &mut Session,
        stitching: &mut Stitching,
        anchor: Location,
        target: Location,
        group: Group<'_>,
    ) -> RoutingResult<()> {
        let view = GridView::new(self.chip, session);
        let path = shortest_path(&view, anchor, target)?;

        // endpoints are already accounted for; only unclaimed interior valves in between need opening
        let stitch = path.iter()
            .copied()
            .skip(1)
            .take(path.len().saturating_sub(2))
            .filter(|cell| view.is_free_valve(*cell))
            .collect_vec();
        debug!(input = group.name, from = %anchor, to = %target, opened = stitch.len(), "group stitched");

        session.claim(stitch.iter().copied());
        stitching.contact.extend(stitch.iter().copied());
        stitching.connected.extend(group.chain);
        stitching.connected.extend(stitch);
        Ok(())
    }
}

/// Accumulates operations, following each open and close with the request's wait.
struct Emitter<'a> {
    chip: &'a Chip,
    wait: u32,
    ops: Vec<ActuationOp>,
}

impl Emitter<'_> {
    fn name(&self, location: Location) -> String {
        self.chip.name_of(location).map(str::to_owned).unwrap_or_else(|| location.to_string())
    }

    fn open(&mut self, location: Location) {
        self.ops.push(ActuationOp::Open(self.name(location)));
        self.ops.push(ActuationOp::Wait(self.wait));
    }

    fn close(&mut self, location: Location) {
        self.ops.push(ActuationOp::Close(self.name(location)));
        self.ops.push(ActuationOp::Wait(self.wait));
    }
}

//! The four-stage order-processing pipeline: validator, matcher, publisher,
//! position-tracker, each a dedicated worker thread connected by bounded
//! queues with an explicit shutdown sentinel.

pub mod matcher;
pub mod position_tracker;
pub mod publisher;
pub mod queue;
pub mod validator;

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::api::{MatcherItem, PositionDelta, TradeEvent, ValidatorItem, WsMessage};
use crate::fees::FeeEngine;
use crate::models::team::TeamDirectory;
use crate::positions::PositionStore;
use crate::response::ResponseCoordinator;
use crate::validation::ConstraintValidator;
use crate::venue::ExchangeVenue;
use queue::{bounded_queue, QueueSender};

/// A running pipeline: the entry queue into the validator stage, the
/// outbound queue a transport layer can drain, and everything needed for a
/// coordinated shutdown.
///
/// Shutdown walks the stages in pipeline order, sentinel then join, rather
/// than pushing all four sentinels at once: a stage only forwards to the
/// next queue while it's still running, so the next queue can't be told to
/// stop until its own feeder stage has actually drained and exited.
pub struct Pipeline {
    pub validator_queue: QueueSender<ValidatorItem>,
    pub outbound_queue: QueueSender<WsMessage>,
    matcher_queue: QueueSender<MatcherItem>,
    publisher_queue: QueueSender<TradeEvent>,
    position_queue: QueueSender<PositionDelta>,
    handles: [JoinHandle<()>; 4],
}

/// Capacity applied to every internal queue in the pipeline.
const QUEUE_CAPACITY: usize = 1024;

impl Pipeline {
    /// Spawn all four stages, wiring their queues together. Each queue gets
    /// its own sender clone so the pipeline can shut every stage down
    /// independently of any producer still holding a sender.
    pub fn spawn(
        venue: Arc<ExchangeVenue>,
        validator: Arc<ConstraintValidator>,
        positions: Arc<PositionStore>,
        coordinator: Arc<ResponseCoordinator>,
        teams: Arc<TeamDirectory>,
        fees: Arc<FeeEngine>,
    ) -> Self {
        let (validator_sender, validator_receiver) = bounded_queue::<ValidatorItem>(QUEUE_CAPACITY);
        let (matcher_sender, matcher_receiver) = bounded_queue::<MatcherItem>(QUEUE_CAPACITY);
        let (publisher_sender, publisher_receiver) = bounded_queue::<TradeEvent>(QUEUE_CAPACITY);
        let (position_sender, position_receiver) = bounded_queue::<PositionDelta>(QUEUE_CAPACITY);
        let (outbound_sender, outbound_receiver) = bounded_queue::<WsMessage>(QUEUE_CAPACITY);
        // outbound_receiver is handed to whatever transport drains it; the
        // pipeline itself only ever produces onto it.
        drop(outbound_receiver);

        let validator_handle = {
            let matcher_sender = matcher_sender.clone();
            let coordinator = coordinator.clone();
            let positions = positions.clone();
            std::thread::spawn(move || validator::run(validator_receiver, matcher_sender, validator, positions, coordinator))
        };

        let matcher_handle = {
            let publisher_sender = publisher_sender.clone();
            std::thread::spawn(move || matcher::run(matcher_receiver, publisher_sender, venue, teams, coordinator))
        };

        let publisher_handle = {
            let position_sender = position_sender.clone();
            let outbound_sender = outbound_sender.clone();
            std::thread::spawn(move || publisher::run(publisher_receiver, position_sender, outbound_sender, fees))
        };

        let position_handle = std::thread::spawn(move || {
            position_tracker::run(position_receiver, positions)
        });

        Pipeline {
            validator_queue: validator_sender,
            outbound_queue: outbound_sender,
            matcher_queue: matcher_sender,
            publisher_queue: publisher_sender,
            position_queue: position_sender,
            handles: [validator_handle, matcher_handle, publisher_handle, position_handle],
        }
    }

    /// Stop every stage, in pipeline order: push a queue's sentinel, join
    /// the stage that reads it (so it's no longer able to feed the next
    /// queue), then move to the next queue. This guarantees every item
    /// already in flight is fully drained before the stage downstream of it
    /// is told to stop.
    pub fn shutdown(self) {
        let [validator_handle, matcher_handle, publisher_handle, position_handle] = self.handles;

        self.validator_queue.shutdown();
        let _ = validator_handle.join();

        self.matcher_queue.shutdown();
        let _ = matcher_handle.join();

        self.publisher_queue.shutdown();
        let _ = publisher_handle.join();

        self.position_queue.shutdown();
        let _ = position_handle.join();
    }
}

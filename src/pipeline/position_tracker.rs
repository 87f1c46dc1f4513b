//! Position-tracker stage: the sole writer into the position store.

use std::sync::Arc;

use super::queue::{recv_until_shutdown, QueueReceiver};
use crate::api::PositionDelta;
use crate::positions::PositionStore;

pub fn run(receiver: QueueReceiver<PositionDelta>, positions: Arc<PositionStore>) {
    while let Some(delta) = recv_until_shutdown(&receiver) {
        positions.update(&delta.team_id, &delta.instrument_id, delta.signed_delta);
        tracing::debug!(
            team_id = %delta.team_id,
            instrument_id = %delta.instrument_id,
            signed_delta = delta.signed_delta,
            "position updated"
        );
    }
    tracing::info!("position-tracker stage shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::queue::bounded_queue;

    #[test]
    fn deltas_accumulate_into_the_store() {
        let positions = Arc::new(PositionStore::new());
        let (sender, receiver) = bounded_queue::<PositionDelta>(4);

        sender
            .send(PositionDelta {
                team_id: "TEAM_A".into(),
                instrument_id: "SPX_4500_CALL".into(),
                signed_delta: 10,
            })
            .unwrap();
        sender
            .send(PositionDelta {
                team_id: "TEAM_A".into(),
                instrument_id: "SPX_4500_CALL".into(),
                signed_delta: -3,
            })
            .unwrap();
        sender.shutdown();

        run(receiver, positions.clone());

        assert_eq!(positions.get("TEAM_A", "SPX_4500_CALL"), 7);
    }
}

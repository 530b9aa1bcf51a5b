//! Per-client input acceptance: ordering, dedup against `lastReceivedTick`,
//! and the anti-flood queue cap. The per-tick one-record consumption lives
//! on `Player::consume_input`; this module only governs what gets in.

use crate::entities::Player;
use crate::message::InputRecord;

/// Accept a batch of input records for one player. Records are sorted by
/// ascending tick before acceptance so a batch that arrives out of order
/// (still an anti-flood / anti-speedhack concern, not a reordering one)
/// is applied in tick order.
pub fn accept_batch(player: &mut Player, mut records: Vec<InputRecord>) {
    records.sort_by_key(|r| r.tick);
    for record in records {
        accept_one(player, record);
    }
}

fn accept_one(player: &mut Player, mut record: InputRecord) {
    if record.tick <= player.last_received_tick {
        return;
    }
    player.last_received_tick = record.tick;
    if !record.rot_y.is_finite() {
        return;
    }
    record.x = record.x.clamp(-1.0, 1.0);
    record.z = record.z.clamp(-1.0, 1.0);
    player.enqueue_input(record);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Team;

    fn input(tick: u64) -> InputRecord {
        InputRecord {
            tick,
            x: 0.0,
            z: 0.0,
            rot_y: 0.0,
            jump_request_id: 0,
        }
    }

    #[test]
    fn rejects_non_advancing_tick() {
        let mut p = Player::new("s1".into(), Team::Red, "d".into(), "p".into());
        accept_batch(&mut p, vec![input(5)]);
        accept_batch(&mut p, vec![input(5), input(4)]);
        assert_eq!(p.input_queue.len(), 1);
        assert_eq!(p.last_received_tick, 5);
    }

    #[test]
    fn sorts_out_of_order_batch() {
        let mut p = Player::new("s1".into(), Team::Red, "d".into(), "p".into());
        accept_batch(&mut p, vec![input(3), input(1), input(2)]);
        let ticks: Vec<u64> = p.input_queue.iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[test]
    fn out_of_range_axes_are_clamped_and_non_finite_roty_is_dropped() {
        let mut p = Player::new("s1".into(), Team::Red, "d".into(), "p".into());
        let mut overshoot = input(1);
        overshoot.x = 100.0;
        overshoot.z = -100.0;
        accept_batch(&mut p, vec![overshoot]);
        assert_eq!(p.input_queue.len(), 1);
        assert_eq!(p.input_queue[0].x, 1.0);
        assert_eq!(p.input_queue[0].z, -1.0);

        let mut bad_rot = input(2);
        bad_rot.rot_y = f32::NAN;
        accept_batch(&mut p, vec![bad_rot]);
        assert_eq!(p.input_queue.len(), 1);
        assert_eq!(p.last_received_tick, 2);
    }
}

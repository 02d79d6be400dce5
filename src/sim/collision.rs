//! Collision resolution between the player and runway objects
//!
//! Cheap axis-interval proxies: an object collides when it crossed the
//! player's depth this frame, sits in the player's lane, and (for pickups
//! and obstacles) is close enough vertically. The first successful hit
//! deactivates an object, so each one resolves at most once.

use glam::Vec3;
use rand::Rng;

use super::runway::{ObjectKind, Runway};
use super::state::{GameState, GameStatus};
use crate::consts::*;

/// Did the object cross the player's depth this frame?
///
/// `prev_z` and `z` are the object's depth before and after the move.
/// Testing the swept interval catches fast objects that jump over the
/// player in a single frame.
#[inline]
pub fn depth_overlap(prev_z: f32, z: f32, player_z: f32) -> bool {
    z > player_z - COLLISION_Z_TOLERANCE && prev_z < player_z + COLLISION_Z_TOLERANCE
}

/// Is the object in the player's lane?
#[inline]
pub fn lateral_overlap(object_x: f32, player_x: f32) -> bool {
    (object_x - player_x).abs() < LANE_TOLERANCE
}

/// Does an obstacle at `obstacle_y` hurt a player at `player_y`?
#[inline]
pub fn obstacle_hits(obstacle_y: f32, player_y: f32) -> bool {
    (obstacle_y - player_y).abs() < OBSTACLE_Y_TOLERANCE && player_y < OBSTACLE_CLEARANCE
}

/// Resolve collisions for one frame.
///
/// `travel` is how far objects moved this frame (already applied to the
/// runway). Returns the number of objects resolved.
pub fn resolve<R: Rng>(
    state: &mut GameState,
    runway: &mut Runway,
    player: Vec3,
    travel: f32,
    rng: &mut R,
) -> usize {
    let mut resolved = 0;

    for obj in runway.objects_mut() {
        // A terminal outcome earlier in the frame ends the run
        if state.status() != GameStatus::Playing {
            break;
        }
        if !obj.active {
            continue;
        }

        let prev_z = obj.position.z - travel;
        if !depth_overlap(prev_z, obj.position.z, player.z) || !lateral_overlap(obj.position.x, player.x) {
            continue;
        }

        let dy = (obj.position.y - player.y).abs();
        match &obj.kind {
            ObjectKind::Door(door) => {
                let is_correct = door.is_correct;
                let text = door.text.clone();
                obj.shatter();
                log::debug!("Door {} hit (correct: {})", obj.id, is_correct);
                state.handle_door_hit(is_correct, &text, rng);
            }
            ObjectKind::Gem(gem) => {
                if dy >= GEM_Y_TOLERANCE {
                    continue;
                }
                let points = gem.points;
                obj.consume();
                state.collect_gem(points);
            }
            ObjectKind::Letter(letter) => {
                if dy >= LETTER_Y_TOLERANCE {
                    continue;
                }
                let letter = letter.letter;
                obj.consume();
                state.collect_letter(letter);
            }
            ObjectKind::Obstacle => {
                if !obstacle_hits(obj.position.y, player.y) {
                    continue;
                }
                obj.shatter();
                log::debug!("Obstacle {} hit", obj.id);
                state.take_damage();
            }
        }
        resolved += 1;
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::runway::{DoorPayload, GemPayload, LetterPayload};
    use crate::sim::state::GameMode;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (GameState, Runway, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut state = GameState::new();
        state.start_game(GameMode::Normal, &mut rng);
        (state, Runway::new(), rng)
    }

    /// Place an object just past the player, as if it moved `travel` this frame
    fn place(runway: &mut Runway, kind: ObjectKind, x: f32, y: f32) {
        runway.spawn(kind, Vec3::new(x, y, 0.1));
    }

    #[test]
    fn test_depth_overlap_sweeps() {
        assert!(depth_overlap(-0.5, 0.5, 0.0));
        // Fast object jumping from far ahead to behind in one frame
        assert!(depth_overlap(-5.0, 3.0, 0.0));
        assert!(!depth_overlap(-10.0, -2.0, 0.0));
        assert!(!depth_overlap(2.0, 3.0, 0.0));
    }

    #[test]
    fn test_gem_pickup() {
        let (mut state, mut runway, mut rng) = setup();
        place(&mut runway, ObjectKind::Gem(GemPayload::GROUND), 0.0, 1.0);

        let n = resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng);
        assert_eq!(n, 1);
        assert_eq!(state.score(), 50);
        assert!(!runway.objects()[0].active);
        assert!(!runway.objects()[0].hit);
    }

    #[test]
    fn test_sky_gem_needs_jump() {
        let (mut state, mut runway, mut rng) = setup();
        place(&mut runway, ObjectKind::Gem(GemPayload::SKY), 0.0, 3.2);

        resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng);
        assert_eq!(state.score(), 0);
        assert!(runway.objects()[0].active);

        resolve(&mut state, &mut runway, Vec3::new(0.0, 2.5, 0.0), 0.6, &mut rng);
        assert_eq!(state.score(), 100);
    }

    #[test]
    fn test_other_lane_ignored() {
        let (mut state, mut runway, mut rng) = setup();
        place(&mut runway, ObjectKind::Obstacle, LANE_WIDTH, 0.0);
        resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng);
        assert_eq!(state.lives(), 3);
    }

    #[test]
    fn test_obstacle_damage_and_jump_clearance() {
        let (mut state, mut runway, mut rng) = setup();
        place(&mut runway, ObjectKind::Obstacle, 0.0, 0.0);

        // Airborne above the clearance: no damage
        resolve(&mut state, &mut runway, Vec3::new(0.0, 1.1, 0.0), 0.6, &mut rng);
        assert_eq!(state.lives(), 3);
        assert!(runway.objects()[0].active);

        resolve(&mut state, &mut runway, Vec3::new(0.0, 0.4, 0.0), 0.6, &mut rng);
        assert_eq!(state.lives(), 2);
        assert!(runway.objects()[0].hit);
    }

    #[test]
    fn test_inactive_objects_resolve_once() {
        let (mut state, mut runway, mut rng) = setup();
        place(&mut runway, ObjectKind::Obstacle, 0.0, 0.0);
        // Letters float, but the tolerance is generous
        place(&mut runway, ObjectKind::Letter(LetterPayload { letter: 'Y' }), 0.0, 1.4);

        assert_eq!(resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng), 2);
        let (score, lives) = (state.score(), state.lives());

        assert_eq!(resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng), 0);
        assert_eq!((state.score(), state.lives()), (score, lives));
        assert_eq!(state.collected_letters(), &['Y']);
    }

    #[test]
    fn test_wrong_door_records_mistake() {
        let (mut state, mut runway, mut rng) = setup();
        place(
            &mut runway,
            ObjectKind::Door(DoorPayload {
                text: "A room booked me".into(),
                is_correct: false,
            }),
            0.0,
            0.0,
        );

        resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng);
        assert_eq!(state.lives(), 2);
        assert_eq!(state.mistakes()[0].selected_answer, "A room booked me");
        assert!(runway.objects()[0].hit);
    }

    #[test]
    fn test_correct_door_advances_question() {
        let (mut state, mut runway, mut rng) = setup();
        place(
            &mut runway,
            ObjectKind::Door(DoorPayload {
                text: state.current_question().unwrap().passive.to_string(),
                is_correct: true,
            }),
            0.0,
            0.0,
        );

        resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng);
        assert_eq!(state.score(), 600);
        assert_eq!(state.used_questions().len(), 2);
    }

    #[test]
    fn test_game_over_stops_resolution() {
        let (mut state, mut runway, mut rng) = setup();
        state.take_damage();
        state.take_damage();
        place(&mut runway, ObjectKind::Obstacle, 0.0, 0.0);
        place(&mut runway, ObjectKind::Gem(GemPayload::GROUND), 0.0, 1.0);

        resolve(&mut state, &mut runway, Vec3::ZERO, 0.6, &mut rng);
        assert_eq!(state.status(), GameStatus::GameOver);
        assert_eq!(state.score(), 0);
        assert!(runway.objects()[1].active);
    }
}

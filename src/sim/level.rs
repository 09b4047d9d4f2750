//! Procedural level content: coins, the shield token and obstacles
//!
//! Structure is fixed per level (obstacle count, placement bands); positions
//! are drawn from the supplied RNG.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Coin, Obstacle, ObstacleShape, ShieldToken, SimContext, Track};
use crate::tuning::LevelTuning;

/// Freshly generated content for one race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub coins: Vec<Coin>,
    pub shield: ShieldToken,
    pub obstacles: Vec<Obstacle>,
}

/// Obstacle count grows linearly with the campaign level
pub fn obstacle_count(tuning: &LevelTuning, level: u32) -> usize {
    (tuning.obstacles_base + level.saturating_sub(1) * tuning.obstacles_per_level) as usize
}

/// Generate coins, shield and obstacles for a track.
///
/// `first_id` is the ID given to the first obstacle; the rest follow sequentially.
pub fn generate_level<R: Rng + ?Sized>(
    rng: &mut R,
    track: &Track,
    level: u32,
    tuning: &LevelTuning,
    first_id: u32,
) -> LevelLayout {
    let band = track.width * tuning.lateral_band_fraction;
    let z = tuning.item_altitude;

    // 1. Coins at randomized intervals down the track
    let mut coins = Vec::new();
    let mut y = tuning.coin_start;
    while y < track.length - tuning.coin_end_buffer {
        let x = rng.random_range(-band..band);
        coins.push(Coin {
            pos: Vec3::new(x, y, z),
            collected: false,
        });
        y += rng.random_range(tuning.coin_step_min..tuning.coin_step_max);
    }

    // 2. One shield token in the middle stretch
    let shield = ShieldToken {
        pos: Vec3::new(
            rng.random_range(-band..band),
            rng.random_range(
                track.length * tuning.shield_band_start..track.length * tuning.shield_band_end,
            ),
            z,
        ),
        collected: false,
    };

    // 3. Obstacles, clear of the start and finish buffers
    let count = obstacle_count(tuning, level);
    let obstacles = (0..count)
        .map(|i| {
            let x = rng.random_range(-band..band);
            let y = rng.random_range(tuning.obstacle_buffer..track.length - tuning.obstacle_buffer);
            let shape = if rng.random_bool(0.5) {
                ObstacleShape::Cube
            } else {
                ObstacleShape::Cone
            };
            Obstacle {
                id: first_id + i as u32,
                pos: Vec3::new(x, y, z),
                shape,
                destroyed: false,
            }
        })
        .collect();

    LevelLayout {
        coins,
        shield,
        obstacles,
    }
}

impl SimContext {
    /// Replace the world content with a fresh layout for the current level
    pub fn regenerate_level(&mut self) {
        let level = self.campaign.level;
        let track = self.race.track;
        let count = obstacle_count(&self.tuning.level, level) as u32;
        let first_id = self.next_entity_id();
        // Reserve the rest of the obstacle ID range
        for _ in 1..count {
            self.next_entity_id();
        }

        let layout = generate_level(&mut self.rng, &track, level, &self.tuning.level, first_id);
        log::info!(
            "Level {}: track {}m, {} coins, {} obstacles",
            level,
            track.length,
            layout.coins.len(),
            layout.obstacles.len()
        );

        self.coins = layout.coins;
        self.shield = Some(layout.shield);
        self.obstacles = layout.obstacles;
        self.projectiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_obstacle_count_per_level() {
        let tuning = LevelTuning::default();
        assert_eq!(obstacle_count(&tuning, 1), 8);
        assert_eq!(obstacle_count(&tuning, 2), 12);
        assert_eq!(obstacle_count(&tuning, 3), 16);
    }

    #[test]
    fn test_layout_stays_within_bands() {
        let tuning = LevelTuning::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        for level in 1..=3 {
            let track = Track::for_level(level);
            let layout = generate_level(&mut rng, &track, level, &tuning, 1);
            let band = track.width / 3.0;

            assert!(!layout.coins.is_empty());
            let mut last_y = f32::MIN;
            for coin in &layout.coins {
                assert!(!coin.collected);
                assert!(coin.pos.x.abs() <= band);
                assert!(coin.pos.y >= 200.0 && coin.pos.y < track.length - 500.0);
                assert!(coin.pos.y - last_y >= 200.0 || last_y == f32::MIN);
                last_y = coin.pos.y;
            }

            let shield = &layout.shield;
            assert!(!shield.collected);
            assert!(shield.pos.y >= track.length * 0.3 && shield.pos.y <= track.length * 0.8);
            assert!(shield.pos.x.abs() <= band);

            for obstacle in &layout.obstacles {
                assert!(!obstacle.destroyed);
                assert!(obstacle.pos.y >= 400.0 && obstacle.pos.y <= track.length - 400.0);
                assert!(obstacle.pos.x.abs() <= band);
            }
        }
    }

    #[test]
    fn test_obstacle_ids_are_sequential() {
        let tuning = LevelTuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let layout = generate_level(&mut rng, &Track::for_level(2), 2, &tuning, 40);
        let ids: Vec<u32> = layout.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, (40..52).collect::<Vec<u32>>());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let tuning = LevelTuning::default();
        let track = Track::for_level(1);
        let a = generate_level(&mut Pcg32::seed_from_u64(9), &track, 1, &tuning, 1);
        let b = generate_level(&mut Pcg32::seed_from_u64(9), &track, 1, &tuning, 1);
        assert_eq!(a.coins.len(), b.coins.len());
        for (x, y) in a.obstacles.iter().zip(&b.obstacles) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.shape, y.shape);
        }
    }

    #[test]
    fn test_regenerate_replaces_content() {
        let mut ctx = SimContext::new(3);
        ctx.campaign.level = 2;
        ctx.race.track = Track::for_level(2);
        ctx.regenerate_level();
        assert_eq!(ctx.obstacles.len(), 12);
        assert!(ctx.shield.is_some());
        let first_ids: Vec<u32> = ctx.obstacles.iter().map(|o| o.id).collect();

        ctx.regenerate_level();
        // IDs never repeat across regenerations
        assert!(ctx.obstacles.iter().all(|o| !first_ids.contains(&o.id)));
    }

    proptest! {
        #[test]
        fn prop_obstacle_count_is_deterministic(seed in any::<u64>(), level in 1u32..=3) {
            let tuning = LevelTuning::default();
            let track = Track::for_level(level);
            let layout = generate_level(&mut Pcg32::seed_from_u64(seed), &track, level, &tuning, 1);
            prop_assert_eq!(
                layout.obstacles.len(),
                8 + (level as usize - 1) * 4
            );
        }
    }
}

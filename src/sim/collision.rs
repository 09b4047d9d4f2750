//! Proximity collision rules
//!
//! Pickups use full 3D distance; obstacles and craft-to-craft checks use
//! ground-plane distance so the hover bob never decides a hit.

use glam::Vec3;

use super::state::{
    Coin, Craft, DestroyCause, GameEvent, Obstacle, PLAYER_INDEX, ShieldToken, SimContext,
};
use crate::consts::{CRAFT_COLLISION_RADIUS, OBSTACLE_HIT_RADIUS, PICKUP_RADIUS};
use crate::planar_distance;

/// What the player touched this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactReport {
    /// Indices of coins collected
    pub coins: Vec<usize>,
    pub shield_collected: bool,
    /// Obstacle destroyed by spending the shield
    pub shielded_obstacle: Option<u32>,
    /// Player hit an obstacle without a shield
    pub crashed: bool,
}

#[inline]
pub fn in_pickup_range(craft: Vec3, item: Vec3) -> bool {
    craft.distance(item) < PICKUP_RADIUS
}

#[inline]
pub fn hits_obstacle(craft: Vec3, obstacle: &Obstacle) -> bool {
    obstacle.is_live() && planar_distance(craft, obstacle.pos) < OBSTACLE_HIT_RADIUS
}

/// Two craft close enough to collide mid-air
#[inline]
pub fn crafts_collide(a: &Craft, b: &Craft) -> bool {
    planar_distance(a.pos, b.pos) < CRAFT_COLLISION_RADIUS
}

/// Check the player against coins, the shield token and obstacles.
///
/// Obstacle contact is exclusive: a held shield is spent on the first obstacle
/// touched (destroying it); any further contact, or contact without a shield,
/// crashes the craft.
pub fn check_player_contacts(
    player: &mut Craft,
    coins: &mut [Coin],
    shield: Option<&mut ShieldToken>,
    obstacles: &mut [Obstacle],
) -> ContactReport {
    let mut report = ContactReport::default();

    for (index, coin) in coins.iter_mut().enumerate() {
        if !coin.collected && in_pickup_range(player.pos, coin.pos) && coin.collect() {
            report.coins.push(index);
        }
    }

    if let Some(token) = shield
        && !token.collected
        && in_pickup_range(player.pos, token.pos)
    {
        token.collected = true;
        player.has_shield = true;
        report.shield_collected = true;
    }

    for obstacle in obstacles.iter_mut() {
        if !hits_obstacle(player.pos, obstacle) {
            continue;
        }
        if player.has_shield {
            player.has_shield = false;
            obstacle.destroy();
            report.shielded_obstacle = Some(obstacle.id);
        } else {
            player.crash();
            report.crashed = true;
            break;
        }
    }

    report
}

/// Mark every pair of intact craft within collision range as crashed.
///
/// Finished craft still collide. Pairs are found against the state at the
/// start of the check, so the result does not depend on iteration order.
/// Returns the indices of craft that crashed.
pub fn check_craft_pairs(crafts: &mut [Craft]) -> Vec<usize> {
    let mut hit = vec![false; crafts.len()];
    for i in 0..crafts.len() {
        if crafts[i].crashed {
            continue;
        }
        for j in (i + 1)..crafts.len() {
            if !crafts[j].crashed && crafts_collide(&crafts[i], &crafts[j]) {
                hit[i] = true;
                hit[j] = true;
            }
        }
    }

    hit.iter()
        .enumerate()
        .filter(|&(_, &h)| h)
        .map(|(index, _)| index)
        .filter(|&index| crafts[index].crash())
        .collect()
}

/// Run all collision rules for one tick, updating score and events
pub fn run_collisions(ctx: &mut SimContext) {
    for index in check_craft_pairs(&mut ctx.crafts) {
        if index == PLAYER_INDEX {
            log::info!("Mid-air collision! Player down");
        } else {
            log::debug!("AI craft {} lost in mid-air collision", index);
        }
        ctx.emit(GameEvent::CraftCrashed { craft: index });
    }

    if !ctx.player().is_active() {
        return;
    }

    let SimContext {
        crafts,
        coins,
        shield,
        obstacles,
        ..
    } = ctx;
    let report = check_player_contacts(
        &mut crafts[PLAYER_INDEX],
        coins,
        shield.as_mut(),
        obstacles,
    );

    ctx.campaign.score += report.coins.len() as u64;
    for index in report.coins {
        ctx.emit(GameEvent::CoinCollected { index });
    }
    if report.shield_collected {
        log::debug!("Shield collected");
        ctx.emit(GameEvent::ShieldCollected);
    }
    if let Some(id) = report.shielded_obstacle {
        log::info!("Shield absorbed obstacle {}", id);
        ctx.emit(GameEvent::ObstacleDestroyed {
            id,
            cause: DestroyCause::Shield,
        });
    }
    if report.crashed {
        log::info!("Player hit an obstacle");
        ctx.emit(GameEvent::CraftCrashed {
            craft: PLAYER_INDEX,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{CraftRole, ObstacleShape};
    use crate::tuning::CraftConfig;
    use proptest::prelude::*;

    fn player_at(x: f32, y: f32) -> Craft {
        Craft::new(CraftRole::Player, CraftConfig::player(), Vec3::new(x, y, 30.0))
    }

    fn ai_at(x: f32, y: f32) -> Craft {
        Craft::new(CraftRole::Ai, CraftConfig::ai(), Vec3::new(x, y, 30.0))
    }

    fn obstacle(id: u32, x: f32, y: f32) -> Obstacle {
        Obstacle {
            id,
            pos: Vec3::new(x, y, 30.0),
            shape: ObstacleShape::Cube,
            destroyed: false,
        }
    }

    fn coin(x: f32, y: f32, z: f32) -> Coin {
        Coin {
            pos: Vec3::new(x, y, z),
            collected: false,
        }
    }

    #[test]
    fn test_coin_pickup_uses_3d_distance() {
        let mut player = player_at(0.0, 1000.0);
        // Planar distance 0 but 70 units above: out of range
        let mut coins = vec![coin(0.0, 1000.0, 100.0), coin(30.0, 1030.0, 30.0)];
        let report = check_player_contacts(&mut player, &mut coins, None, &mut []);
        assert_eq!(report.coins, vec![1]);
        assert!(!coins[0].collected);
        assert!(coins[1].collected);

        // Already collected coins are never reported again
        let report = check_player_contacts(&mut player, &mut coins, None, &mut []);
        assert!(report.coins.is_empty());
    }

    #[test]
    fn test_shield_pickup_arms_player() {
        let mut player = player_at(0.0, 0.0);
        let mut token = ShieldToken {
            pos: Vec3::new(20.0, 20.0, 30.0),
            collected: false,
        };
        let report = check_player_contacts(&mut player, &mut [], Some(&mut token), &mut []);
        assert!(report.shield_collected);
        assert!(token.collected);
        assert!(player.has_shield);
    }

    #[test]
    fn test_obstacle_uses_planar_distance() {
        let mut player = player_at(0.0, 0.0);
        player.pos.z = 200.0;
        let mut obstacles = vec![obstacle(1, 50.0, 0.0)];
        let report = check_player_contacts(&mut player, &mut [], None, &mut obstacles);
        assert!(report.crashed);
        assert!(player.crashed);
    }

    #[test]
    fn test_shield_destroys_obstacle_instead_of_crashing() {
        let mut player = player_at(0.0, 0.0);
        player.has_shield = true;
        let mut obstacles = vec![obstacle(7, 10.0, 10.0)];
        let report = check_player_contacts(&mut player, &mut [], None, &mut obstacles);
        assert_eq!(report.shielded_obstacle, Some(7));
        assert!(!report.crashed);
        assert!(!player.crashed);
        assert!(!player.has_shield);
        assert!(obstacles[0].destroyed);
    }

    #[test]
    fn test_shield_is_spent_on_first_obstacle_only() {
        let mut player = player_at(0.0, 0.0);
        player.has_shield = true;
        let mut obstacles = vec![obstacle(1, 10.0, 0.0), obstacle(2, -10.0, 0.0)];
        let report = check_player_contacts(&mut player, &mut [], None, &mut obstacles);
        assert_eq!(report.shielded_obstacle, Some(1));
        assert!(report.crashed);
        assert!(obstacles[0].destroyed);
        assert!(!obstacles[1].destroyed);
    }

    #[test]
    fn test_destroyed_obstacles_are_ignored() {
        let mut player = player_at(0.0, 0.0);
        let mut obstacles = vec![obstacle(1, 0.0, 0.0)];
        obstacles[0].destroyed = true;
        let report = check_player_contacts(&mut player, &mut [], None, &mut obstacles);
        assert!(!report.crashed);
        assert!(!player.crashed);
    }

    #[test]
    fn test_craft_pair_crashes_both() {
        let mut crafts = vec![player_at(0.0, 0.0), ai_at(500.0, 0.0), ai_at(500.0, 79.0)];
        let crashed = check_craft_pairs(&mut crafts);
        assert_eq!(crashed, vec![1, 2]);
        assert!(!crafts[0].crashed);
        assert!(crafts[1].crashed && crafts[2].crashed);
    }

    #[test]
    fn test_craft_pair_radius_is_exclusive() {
        let mut crafts = vec![player_at(0.0, 0.0), ai_at(80.0, 0.0)];
        assert!(check_craft_pairs(&mut crafts).is_empty());
    }

    #[test]
    fn test_crashed_craft_do_not_collide() {
        let mut crafts = vec![player_at(0.0, 0.0), ai_at(10.0, 0.0)];
        crafts[1].crashed = true;
        assert!(check_craft_pairs(&mut crafts).is_empty());
        assert!(!crafts[0].crashed);
    }

    #[test]
    fn test_finished_craft_can_be_rammed() {
        let mut crafts = vec![player_at(0.0, 0.0), ai_at(0.0, 4805.0), ai_at(20.0, 4790.0)];
        crafts[1].finished = true;
        crafts[1].race_time = Some(1.0);
        let crashed = check_craft_pairs(&mut crafts);
        assert_eq!(crashed, vec![1, 2]);
        assert!(crafts[1].finished && crafts[1].crashed);
        assert!(!crafts[0].crashed);
    }

    #[test]
    fn test_run_collisions_scores_coins() {
        let mut ctx = SimContext::new(1);
        ctx.coins = vec![coin(0.0, 0.0, 30.0), coin(0.0, 2000.0, 30.0)];
        ctx.campaign.score = 4;
        run_collisions(&mut ctx);
        assert_eq!(ctx.campaign.score, 5);
        assert_eq!(
            ctx.drain_events(),
            vec![GameEvent::CoinCollected { index: 0 }]
        );
    }

    proptest! {
        #[test]
        fn prop_pairs_are_order_independent(
            positions in proptest::collection::vec((-300.0f32..300.0, 0.0f32..600.0), 2..6)
        ) {
            let mut forward: Vec<Craft> = positions.iter().map(|&(x, y)| ai_at(x, y)).collect();
            let mut reversed: Vec<Craft> =
                positions.iter().rev().map(|&(x, y)| ai_at(x, y)).collect();
            check_craft_pairs(&mut forward);
            check_craft_pairs(&mut reversed);
            let a: Vec<bool> = forward.iter().map(|c| c.crashed).collect();
            let mut b: Vec<bool> = reversed.iter().map(|c| c.crashed).collect();
            b.reverse();
            prop_assert_eq!(a, b);
        }
    }
}

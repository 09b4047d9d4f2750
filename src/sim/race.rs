//! Race flow: menu, setup, racing, pause, finish and campaign progression

use super::state::{Craft, GameEvent, RaceOutcome, RacePhase, SimContext, Track};
use crate::settings::Difficulty;

/// Player wins unless an AI craft finished (intact) with a strictly faster time.
///
/// AI craft still in the air, or crashed, are not counted.
pub fn player_wins(player: &Craft, ai: &[Craft]) -> bool {
    let Some(player_time) = player.race_time else {
        return false;
    };
    !ai.iter().any(|craft| {
        craft.finished
            && !craft.crashed
            && craft.race_time.is_some_and(|time| time < player_time)
    })
}

impl SimContext {
    /// Menu -> Racing: single lap at the last selected difficulty
    pub fn start_quick_race(&mut self) {
        if self.phase != RacePhase::Menu {
            return;
        }
        self.begin_race(1, self.settings.custom_difficulty);
    }

    /// Menu -> CustomRaceSetup
    pub fn open_setup(&mut self) {
        if self.phase == RacePhase::Menu {
            self.phase = RacePhase::CustomRaceSetup;
        }
    }

    /// Choose the custom race lap count (snapped to a selectable option)
    pub fn select_laps(&mut self, laps: u32) {
        if self.phase != RacePhase::CustomRaceSetup {
            return;
        }
        let snapped = self.tuning.campaign.nearest_lap_option(laps);
        if snapped != laps {
            log::warn!("Lap count {} not selectable, using {}", laps, snapped);
        }
        self.settings.custom_laps = snapped;
    }

    /// Choose the custom race difficulty tier (clamped to 1..=3)
    pub fn select_difficulty(&mut self, tier: u32) {
        if self.phase != RacePhase::CustomRaceSetup {
            return;
        }
        let difficulty = Difficulty::from_tier(tier);
        if difficulty.tier() != tier {
            log::warn!(
                "Difficulty tier {} out of range, using {}",
                tier,
                difficulty.as_str()
            );
        }
        self.settings.custom_difficulty = difficulty;
    }

    /// CustomRaceSetup -> Racing with the selected laps and difficulty
    pub fn confirm_setup(&mut self) {
        if self.phase != RacePhase::CustomRaceSetup {
            return;
        }
        let laps = self.tuning.campaign.nearest_lap_option(self.settings.custom_laps);
        self.begin_race(laps, self.settings.custom_difficulty);
    }

    /// CustomRaceSetup -> Menu
    pub fn cancel_setup(&mut self) {
        if self.phase == RacePhase::CustomRaceSetup {
            self.phase = RacePhase::Menu;
        }
    }

    /// Racing <-> Paused
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            RacePhase::Racing => RacePhase::Paused,
            RacePhase::Paused => RacePhase::Racing,
            other => other,
        };
    }

    /// Restart the race at the current level with the same laps and difficulty
    pub fn retry(&mut self) {
        if matches!(
            self.phase,
            RacePhase::Finished | RacePhase::Racing | RacePhase::Paused
        ) {
            self.begin_race(self.race.total_laps, self.race.difficulty);
        }
    }

    /// Leave the current screen for the menu. Campaign counters are kept.
    pub fn abort(&mut self) {
        match self.phase {
            RacePhase::CustomRaceSetup => self.cancel_setup(),
            RacePhase::Racing
            | RacePhase::Paused
            | RacePhase::Finished
            | RacePhase::CampaignComplete => {
                log::info!("Returning to menu");
                self.projectiles.clear();
                self.phase = RacePhase::Menu;
            }
            RacePhase::Menu => {}
        }
    }

    /// Reset craft and content for a new race at the current campaign level
    fn begin_race(&mut self, laps: u32, difficulty: Difficulty) {
        let level = self.campaign.level;
        self.race.total_laps = laps;
        self.race.difficulty = difficulty;
        self.race.track = Track::for_level(level);
        self.reset_crafts();
        self.regenerate_level();
        self.race_clock = 0.0;
        self.outcome = None;
        self.phase = RacePhase::Racing;
        log::info!(
            "Race start: level {}/{}, {} lap(s), {}",
            level,
            self.max_level(),
            laps,
            difficulty.as_str()
        );
        self.emit(GameEvent::RaceStarted { level, laps });
    }

    /// Decide whether the running race is over and apply the outcome
    pub fn evaluate_race(&mut self) {
        if self.phase != RacePhase::Racing {
            return;
        }

        if self.player().crashed {
            self.finish_race(RaceOutcome::Crashed);
            return;
        }

        if !self.player().finished {
            return;
        }
        if !self.ai_crafts().iter().all(|c| c.crashed || c.finished) {
            return;
        }

        if player_wins(self.player(), self.ai_crafts()) {
            self.finish_race(RaceOutcome::Won);
            self.level_up();
        } else {
            self.finish_race(RaceOutcome::Lost);
        }
    }

    fn finish_race(&mut self, outcome: RaceOutcome) {
        log::info!("Race over: {:?}", outcome);
        self.phase = RacePhase::Finished;
        self.outcome = Some(outcome);
        self.projectiles.clear();
        self.emit(GameEvent::RaceFinished { outcome });
    }

    fn level_up(&mut self) {
        self.campaign.races_won += 1;
        self.campaign.level += 1;
        let max_level = self.max_level();
        if self.campaign.level > max_level {
            self.campaign.level = max_level;
            self.phase = RacePhase::CampaignComplete;
            self.complete_timer = 0.0;
            log::info!(
                "Campaign complete! score {}, {} wins",
                self.campaign.score,
                self.campaign.races_won
            );
            self.emit(GameEvent::CampaignComplete);
        } else {
            log::info!("Advancing to level {}", self.campaign.level);
            self.emit(GameEvent::LevelUp {
                level: self.campaign.level,
            });
        }
    }

    /// Count down the campaign-complete screen; restart the campaign when it elapses
    pub fn update_campaign_complete(&mut self, dt: f32) {
        if self.phase != RacePhase::CampaignComplete {
            return;
        }
        self.complete_timer += dt;
        if self.complete_timer >= self.tuning.campaign.auto_restart_delay {
            self.restart_campaign();
        }
    }

    /// Seconds until the campaign-complete screen restarts the campaign
    pub fn restart_countdown(&self) -> Option<f32> {
        (self.phase == RacePhase::CampaignComplete)
            .then(|| (self.tuning.campaign.auto_restart_delay - self.complete_timer).max(0.0))
    }

    /// Reset level, wins and score, then return to the menu
    pub fn restart_campaign(&mut self) {
        log::info!("Restarting campaign");
        self.campaign = Default::default();
        self.race.track = Track::for_level(1);
        self.complete_timer = 0.0;
        self.phase = RacePhase::Menu;
        self.emit(GameEvent::CampaignRestarted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CraftRole;
    use crate::tuning::CraftConfig;
    use glam::Vec3;
    use proptest::prelude::*;

    fn craft(role: CraftRole, finished: bool, crashed: bool, time: Option<f32>) -> Craft {
        let mut craft = Craft::new(role, CraftConfig::ai(), Vec3::ZERO);
        craft.finished = finished;
        craft.crashed = crashed;
        craft.race_time = time;
        craft
    }

    fn finished_player(time: f32) -> Craft {
        craft(CraftRole::Player, true, false, Some(time))
    }

    /// Context mid-race with the player across the line and every AI done
    fn finished_race(level: u32, ai_time: Option<f32>) -> SimContext {
        let mut ctx = SimContext::new(1);
        ctx.campaign.level = level;
        ctx.start_quick_race();
        ctx.crafts[0] = finished_player(30.0);
        for ai in ctx.crafts.iter_mut().skip(1) {
            *ai = match ai_time {
                Some(t) => craft(CraftRole::Ai, true, false, Some(t)),
                None => craft(CraftRole::Ai, false, true, None),
            };
        }
        ctx
    }

    #[test]
    fn test_menu_start_race() {
        let mut ctx = SimContext::new(1);
        ctx.start_quick_race();
        assert_eq!(ctx.phase, RacePhase::Racing);
        assert_eq!(ctx.race.total_laps, 1);
        assert_eq!(ctx.obstacles.len(), 8);
        assert!(ctx.shield.is_some());
        assert_eq!(ctx.race_clock, 0.0);
        assert_eq!(
            ctx.drain_events(),
            vec![GameEvent::RaceStarted { level: 1, laps: 1 }]
        );
    }

    #[test]
    fn test_quick_race_keeps_selected_difficulty() {
        let mut ctx = SimContext::new(1);
        ctx.open_setup();
        ctx.select_laps(5);
        ctx.select_difficulty(2);
        ctx.cancel_setup();

        ctx.start_quick_race();
        assert_eq!(ctx.race.total_laps, 1);
        assert_eq!(ctx.race.difficulty, Difficulty::Pilot);
    }

    #[test]
    fn test_custom_setup_flow() {
        let mut ctx = SimContext::new(1);
        ctx.open_setup();
        assert_eq!(ctx.phase, RacePhase::CustomRaceSetup);
        ctx.select_laps(3);
        ctx.select_difficulty(3);
        ctx.confirm_setup();
        assert_eq!(ctx.phase, RacePhase::Racing);
        assert_eq!(ctx.race.total_laps, 3);
        assert_eq!(ctx.race.difficulty, Difficulty::Ace);
    }

    #[test]
    fn test_setup_clamps_out_of_range_selections() {
        let mut ctx = SimContext::new(1);
        ctx.open_setup();
        ctx.select_laps(4);
        ctx.select_difficulty(9);
        assert_eq!(ctx.settings.custom_laps, 3);
        assert_eq!(ctx.settings.custom_difficulty, Difficulty::Ace);
        ctx.select_laps(0);
        ctx.select_difficulty(0);
        assert_eq!(ctx.settings.custom_laps, 1);
        assert_eq!(ctx.settings.custom_difficulty, Difficulty::Cadet);
    }

    #[test]
    fn test_selections_ignored_outside_setup() {
        let mut ctx = SimContext::new(1);
        ctx.select_laps(5);
        assert_eq!(ctx.settings.custom_laps, 1);
    }

    #[test]
    fn test_setup_cancel_returns_to_menu() {
        let mut ctx = SimContext::new(1);
        ctx.open_setup();
        ctx.cancel_setup();
        assert_eq!(ctx.phase, RacePhase::Menu);
    }

    #[test]
    fn test_pause_toggle() {
        let mut ctx = SimContext::new(1);
        ctx.toggle_pause();
        assert_eq!(ctx.phase, RacePhase::Menu);
        ctx.start_quick_race();
        ctx.toggle_pause();
        assert_eq!(ctx.phase, RacePhase::Paused);
        ctx.toggle_pause();
        assert_eq!(ctx.phase, RacePhase::Racing);
    }

    #[test]
    fn test_player_crash_finishes_race() {
        let mut ctx = SimContext::new(1);
        ctx.start_quick_race();
        ctx.player_mut().crashed = true;
        ctx.evaluate_race();
        assert_eq!(ctx.phase, RacePhase::Finished);
        assert_eq!(ctx.outcome, Some(RaceOutcome::Crashed));
        assert_eq!(ctx.campaign.level, 1);
    }

    #[test]
    fn test_finished_player_waits_for_ai() {
        let mut ctx = finished_race(1, Some(40.0));
        ctx.crafts[2] = craft(CraftRole::Ai, false, false, None);
        ctx.evaluate_race();
        assert_eq!(ctx.phase, RacePhase::Racing);

        ctx.crafts[2].crashed = true;
        ctx.evaluate_race();
        assert_eq!(ctx.phase, RacePhase::Finished);
    }

    #[test]
    fn test_win_advances_level() {
        let mut ctx = finished_race(1, Some(45.0));
        ctx.evaluate_race();
        assert_eq!(ctx.phase, RacePhase::Finished);
        assert_eq!(ctx.outcome, Some(RaceOutcome::Won));
        assert_eq!(ctx.campaign.level, 2);
        assert_eq!(ctx.campaign.races_won, 1);
    }

    #[test]
    fn test_loss_keeps_level() {
        let mut ctx = finished_race(2, Some(20.0));
        ctx.evaluate_race();
        assert_eq!(ctx.outcome, Some(RaceOutcome::Lost));
        assert_eq!(ctx.campaign.level, 2);
        assert_eq!(ctx.campaign.races_won, 0);
    }

    #[test]
    fn test_win_at_max_level_completes_campaign() {
        let mut ctx = finished_race(3, None);
        ctx.evaluate_race();
        assert_eq!(ctx.phase, RacePhase::CampaignComplete);
        assert_eq!(ctx.campaign.level, 3);
        assert_eq!(ctx.campaign.races_won, 1);
        assert!(ctx.drain_events().contains(&GameEvent::CampaignComplete));
    }

    #[test]
    fn test_campaign_auto_restart_resets_counters() {
        let mut ctx = finished_race(3, None);
        ctx.campaign.score = 17;
        ctx.evaluate_race();
        ctx.update_campaign_complete(1.0);
        assert_eq!(ctx.phase, RacePhase::CampaignComplete);
        assert!((ctx.restart_countdown().unwrap() - 2.0).abs() < 1e-6);
        ctx.update_campaign_complete(2.0);
        assert_eq!(ctx.phase, RacePhase::Menu);
        assert_eq!(ctx.campaign.level, 1);
        assert_eq!(ctx.campaign.score, 0);
        assert_eq!(ctx.campaign.races_won, 0);
        assert_eq!(ctx.restart_countdown(), None);
    }

    #[test]
    fn test_campaign_abort_keeps_counters() {
        let mut ctx = finished_race(3, None);
        ctx.campaign.score = 17;
        ctx.evaluate_race();
        ctx.abort();
        assert_eq!(ctx.phase, RacePhase::Menu);
        assert_eq!(ctx.campaign.level, 3);
        assert_eq!(ctx.campaign.score, 17);
        assert_eq!(ctx.campaign.races_won, 1);
    }

    #[test]
    fn test_retry_keeps_settings_and_level() {
        let mut ctx = SimContext::new(1);
        ctx.open_setup();
        ctx.select_laps(5);
        ctx.confirm_setup();
        ctx.player_mut().crashed = true;
        ctx.evaluate_race();
        ctx.campaign.score = 3;
        ctx.retry();
        assert_eq!(ctx.phase, RacePhase::Racing);
        assert_eq!(ctx.race.total_laps, 5);
        assert!(!ctx.player().crashed);
        assert_eq!(ctx.campaign.score, 3);
        assert_eq!(ctx.outcome, None);
    }

    #[test]
    fn test_abort_from_finished() {
        let mut ctx = SimContext::new(1);
        ctx.start_quick_race();
        ctx.player_mut().crashed = true;
        ctx.evaluate_race();
        ctx.abort();
        assert_eq!(ctx.phase, RacePhase::Menu);
    }

    #[test]
    fn test_win_rule_ignores_unfinished_and_crashed_ai() {
        let player = finished_player(30.0);
        let ai = vec![
            craft(CraftRole::Ai, false, false, None),
            craft(CraftRole::Ai, false, true, None),
            craft(CraftRole::Ai, true, false, Some(30.0)),
        ];
        assert!(player_wins(&player, &ai));

        let faster = vec![craft(CraftRole::Ai, true, false, Some(29.9))];
        assert!(!player_wins(&player, &faster));

        // Rammed after finishing: no longer a threat
        let rammed = vec![craft(CraftRole::Ai, true, true, Some(1.0))];
        assert!(player_wins(&player, &rammed));
    }

    proptest! {
        #[test]
        fn prop_win_iff_no_faster_finisher(
            player_time in 1.0f32..100.0,
            ai in proptest::collection::vec((any::<bool>(), 1.0f32..100.0), 0..5),
        ) {
            let player = finished_player(player_time);
            let crafts: Vec<Craft> = ai
                .iter()
                .map(|&(finished, t)| craft(CraftRole::Ai, finished, false, finished.then_some(t)))
                .collect();
            let expected = !ai.iter().any(|&(finished, t)| finished && t < player_time);
            prop_assert_eq!(player_wins(&player, &crafts), expected);
        }
    }
}

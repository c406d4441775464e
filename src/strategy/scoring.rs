//! Player fit scoring
//!
//! Maps a player's role, age and career numbers onto a 1–10 fit score for a
//! given team personality. Pure and deterministic: the same inputs always
//! produce the same score.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{Player, PlayerPreference, StrengthCategory, TeamPersonality};

pub const NEUTRAL_SCORE: Decimal = dec!(5);
pub const MIN_SCORE: Decimal = dec!(1);
pub const MAX_SCORE: Decimal = dec!(10);

const PRIMARY_ROLE_BONUS: Decimal = dec!(2);
const SECONDARY_ROLE_BONUS: Decimal = dec!(1);
const AGE_BONUS: Decimal = dec!(1.5);
const STAT_BONUS_CAP: Decimal = dec!(2);

/// Older than this counts as experienced
const EXPERIENCED_AGE: u32 = 28;
/// Younger than this counts as young talent
const YOUNG_AGE: u32 = 27;

const BATTING_AVERAGE_FLOOR: Decimal = dec!(30);
const BATTING_AVERAGE_STEP: Decimal = dec!(10);
const STRIKE_RATE_FLOOR: Decimal = dec!(130);
const STRIKE_RATE_STEP: Decimal = dec!(20);
const WICKETS_FLOOR: Decimal = dec!(50);
const WICKETS_STEP: Decimal = dec!(25);
const ECONOMY_CEILING: Decimal = dec!(8);

/// Fit score of `player` for `personality`, always within [1, 10].
pub fn score_player(player: &Player, personality: &TeamPersonality) -> Decimal {
    let mut score = NEUTRAL_SCORE;

    if personality.primary_strength.matches_role(player.role) {
        score += PRIMARY_ROLE_BONUS;
    }
    if personality.secondary_strength.matches_role(player.role) {
        score += SECONDARY_ROLE_BONUS;
    }

    score += age_bonus(player, personality.player_preference);

    if wants(personality, StrengthCategory::Batting) {
        score += batting_bonus(player);
    }
    if wants(personality, StrengthCategory::Bowling) {
        score += bowling_bonus(player);
    }

    score.clamp(MIN_SCORE, MAX_SCORE)
}

fn wants(personality: &TeamPersonality, category: StrengthCategory) -> bool {
    personality.primary_strength == category || personality.secondary_strength == category
}

fn age_bonus(player: &Player, preference: PlayerPreference) -> Decimal {
    match (preference, player.age) {
        (PlayerPreference::Experienced, Some(age)) if age > EXPERIENCED_AGE => AGE_BONUS,
        (PlayerPreference::YoungTalent, Some(age)) if age < YOUNG_AGE => AGE_BONUS,
        _ => Decimal::ZERO,
    }
}

/// Linear bonus for how far `value` clears `floor`, one point per `step`, capped.
fn scaled_excess(value: Decimal, floor: Decimal, step: Decimal) -> Decimal {
    if value <= floor {
        return Decimal::ZERO;
    }
    ((value - floor) / step).min(STAT_BONUS_CAP)
}

fn batting_bonus(player: &Player) -> Decimal {
    let stats = &player.stats;
    let average = stats
        .batting_average
        .map(|avg| scaled_excess(avg, BATTING_AVERAGE_FLOOR, BATTING_AVERAGE_STEP))
        .unwrap_or_default();
    let strike_rate = stats
        .strike_rate
        .map(|sr| scaled_excess(sr, STRIKE_RATE_FLOOR, STRIKE_RATE_STEP))
        .unwrap_or_default();
    average + strike_rate
}

fn bowling_bonus(player: &Player) -> Decimal {
    let stats = &player.stats;
    let wickets = stats
        .wickets
        .map(|w| scaled_excess(Decimal::from(w), WICKETS_FLOOR, WICKETS_STEP))
        .unwrap_or_default();
    // An economy of zero means no overs bowled, not a perfect spell
    let economy = stats
        .economy
        .filter(|econ| *econ > Decimal::ZERO && *econ < ECONOMY_CEILING)
        .map(|econ| (ECONOMY_CEILING - econ).min(STAT_BONUS_CAP))
        .unwrap_or_default();
    wickets + economy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlayerRole, PlayerStats};

    fn batsman() -> Player {
        Player::new("p1", "Opener", PlayerRole::Batsman, dec!(100))
    }

    #[test]
    fn neutral_player_scores_five() {
        let player = Player::new("p2", "Keeper", PlayerRole::AllRounder, dec!(100));
        // Kolkata: bowling/balanced, no all-rounder affinity, no stats
        assert_eq!(score_player(&player, &TeamPersonality::kolkata()), dec!(5));
    }

    #[test]
    fn primary_and_secondary_role_bonuses() {
        let player = batsman();
        // Mumbai primary batting: 5 + 2
        assert_eq!(score_player(&player, &TeamPersonality::mumbai()), dec!(7));

        let mut team = TeamPersonality::kolkata();
        team.secondary_strength = StrengthCategory::Batting;
        // 5 + 1 (secondary)
        assert_eq!(score_player(&player, &team), dec!(6));
    }

    #[test]
    fn age_preference_bonus() {
        let veteran = batsman().with_age(33);
        let rookie = batsman().with_age(22);
        let mumbai = TeamPersonality::mumbai(); // experienced
        assert_eq!(score_player(&veteran, &mumbai), dec!(8.5));
        assert_eq!(score_player(&rookie, &mumbai), dec!(7));

        let bangalore = TeamPersonality::bangalore(); // young talent, batting primary
        assert_eq!(score_player(&rookie, &bangalore), dec!(8.5));
        // Boundary: 27 is neither young nor experienced enough
        assert_eq!(score_player(&batsman().with_age(27), &bangalore), dec!(7));
    }

    #[test]
    fn batting_stats_scale_and_cap() {
        let mut team = TeamPersonality::kolkata();
        team.primary_strength = StrengthCategory::Balanced;
        team.secondary_strength = StrengthCategory::Batting;
        let player = batsman().with_stats(PlayerStats {
            batting_average: Some(dec!(45)),
            strike_rate: Some(dec!(140)),
            ..Default::default()
        });
        // 5 + 1 (secondary) + 1.5 (avg) + 0.5 (sr)
        assert_eq!(score_player(&player, &team), dec!(8));

        let monster = batsman().with_stats(PlayerStats {
            batting_average: Some(dec!(90)),
            strike_rate: Some(dec!(250)),
            ..Default::default()
        });
        // caps at +2 each; 5 + 1 + 2 + 2
        assert_eq!(score_player(&monster, &team), dec!(10));
    }

    #[test]
    fn bowling_stats_only_for_bowling_teams() {
        let bowler = Player::new("b1", "Quick", PlayerRole::Bowler, dec!(100)).with_stats(
            PlayerStats {
                wickets: Some(100),
                economy: Some(dec!(7)),
                ..Default::default()
            },
        );
        // Kolkata: bowling primary: 5 + 2 + 2 (wickets capped) + 1 (economy)
        assert_eq!(score_player(&bowler, &TeamPersonality::kolkata()), dec!(10));
        // Bangalore has no bowling interest: neutral
        assert_eq!(score_player(&bowler, &TeamPersonality::bangalore()), dec!(5));
    }

    #[test]
    fn score_is_clamped_and_deterministic() {
        let star = batsman().with_age(30).with_stats(PlayerStats {
            batting_average: Some(dec!(60)),
            strike_rate: Some(dec!(180)),
            wickets: Some(200),
            economy: Some(dec!(5)),
            ..Default::default()
        });
        for team in crate::domain::default_personalities() {
            let first = score_player(&star, &team);
            assert!(first >= MIN_SCORE && first <= MAX_SCORE);
            assert_eq!(first, score_player(&star, &team));
        }
    }

    #[test]
    fn zero_economy_earns_nothing() {
        let bowler = Player::new("b2", "Part-timer", PlayerRole::Bowler, dec!(50)).with_stats(
            PlayerStats {
                economy: Some(Decimal::ZERO),
                ..Default::default()
            },
        );
        // 5 + 2 (primary bowling)
        assert_eq!(score_player(&bowler, &TeamPersonality::kolkata()), dec!(7));
    }
}

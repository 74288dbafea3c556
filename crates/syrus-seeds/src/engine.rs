use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::corpus::{self, Antagonist, PresenceStyle, ResolutionStyle, ThreatCategory};
use crate::error::{Result, SeedError};
use crate::rng::RngSource;
use syrus_core::types::CampaignType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpectationViolationKind {
    Inversion,
    Removal,
    PrematureResolution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationViolation {
    pub act_number: u32,
    pub kind: ExpectationViolationKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPackage {
    pub map_id: String,
    pub featured_areas: Vec<String>,
    pub genre_modifier: Option<String>,
    pub perspective_bias: Option<String>,
    pub environmental_oddity: Option<String>,
    pub excluded_motifs: Vec<String>,
    pub objective_id: String,
    pub antagonist_ids: Vec<String>,
    pub twist_ids: Vec<String>,
    pub set_piece_ids: Vec<String>,
    pub constraint_ids: Vec<String>,
    pub moral_asymmetry: bool,
    pub expectation_violation: Option<ExpectationViolation>,
    pub beat_profile_acts: u32,
    pub max_combat_scenes: u32,
}

/// Draws one seed package for `campaign_type`, per the nine-step pipeline.
/// Each step is parameterized by the campaign type's corpus profile; the
/// order is fixed regardless of which branches fire.
pub fn draw(campaign_type: CampaignType, rng_source: &dyn RngSource) -> Result<SeedPackage> {
    let profile = corpus::profile_for(campaign_type);
    let mut rng = rng_source.make_rng();

    // 1. Map + featured areas.
    let map = corpus::MAPS
        .choose(&mut rng)
        .ok_or_else(|| SeedError::SelectionFailed("no maps in corpus".into()))?;
    let area_count = (uniform_count(&mut rng, profile.featured_areas) as usize).min(map.areas.len());
    let featured_areas: Vec<String> = map
        .areas
        .choose_multiple(&mut rng, area_count)
        .map(|a| a.id.to_string())
        .collect();

    // 2. Variance injectors.
    let genre_modifier = if profile.require_sameness_killers >= 1 {
        Some(
            corpus::GENRE_MODIFIERS
                .choose(&mut rng)
                .ok_or_else(|| SeedError::SelectionFailed("no genre modifiers in corpus".into()))?
                .to_string(),
        )
    } else {
        None
    };
    let perspective_bias = if profile.require_perspective_bias {
        Some(
            corpus::PERSPECTIVE_BIASES
                .choose(&mut rng)
                .ok_or_else(|| SeedError::SelectionFailed("no perspective biases in corpus".into()))?
                .to_string(),
        )
    } else {
        None
    };
    let environmental_oddity = if profile.require_sameness_killers >= 2 && rng.gen_bool(0.4) {
        Some(
            corpus::ENVIRONMENTAL_ODDITIES
                .choose(&mut rng)
                .ok_or_else(|| SeedError::SelectionFailed("no environmental oddities in corpus".into()))?
                .to_string(),
        )
    } else {
        None
    };
    let excluded_count = if rng.gen_bool(0.5) { 2 } else { 3 };
    let mut excluded_motifs: Vec<String> = corpus::EXCLUDABLE_MOTIFS
        .choose_multiple(&mut rng, excluded_count)
        .map(|m| m.to_string())
        .collect();
    for default_motif in profile.default_excluded_motifs {
        if !excluded_motifs.iter().any(|m| m == default_motif) {
            excluded_motifs.push(default_motif.to_string());
        }
    }

    // 3. Objective (biased).
    let eligible: Vec<_> = corpus::OBJECTIVES
        .iter()
        .filter(|o| !(profile.force_non_environmental_threat && o.primary_threat_category == ThreatCategory::Ecological))
        .collect();
    if eligible.is_empty() {
        return Err(SeedError::SelectionFailed("no eligible objectives after threat-category filter".into()));
    }
    let terrain_matched: Vec<_> = eligible
        .iter()
        .copied()
        .filter(|o| o.terrain_tags.iter().any(|t| map.terrain_tags.contains(t)))
        .collect();
    let preferred: Vec<_> = terrain_matched
        .iter()
        .copied()
        .filter(|o| profile.prefer_categories.contains(&o.primary_threat_category))
        .collect();
    let actionable: Vec<_> = preferred
        .iter()
        .copied()
        .filter(|o| {
            matches!(
                o.resolution_style,
                ResolutionStyle::Violent | ResolutionStyle::Tactical | ResolutionStyle::Survival
            )
        })
        .collect();
    let objective = if rng.gen_bool(0.8) {
        if !actionable.is_empty() {
            actionable.choose(&mut rng).copied()
        } else if !preferred.is_empty() {
            preferred.choose(&mut rng).copied()
        } else if !terrain_matched.is_empty() {
            terrain_matched.choose(&mut rng).copied()
        } else if !eligible.is_empty() {
            eligible.choose(&mut rng).copied()
        } else {
            corpus::OBJECTIVES.choose(&mut rng)
        }
    } else {
        eligible.choose(&mut rng).copied()
    }
    .ok_or_else(|| SeedError::SelectionFailed("objective selection exhausted all fallbacks".into()))?;

    // 4. Antagonists (diversity-enforced).
    let antagonist_count = uniform_count(&mut rng, profile.antagonists) as usize;
    let antagonists = select_antagonists(
        &mut rng,
        antagonist_count,
        profile.require_multiple_threat_categories,
    )?;

    // 5. Twists / set pieces.
    let twist_count = (uniform_count(&mut rng, profile.twists) as usize).min(corpus::TWISTS.len());
    let twist_ids: Vec<String> = corpus::TWISTS
        .choose_multiple(&mut rng, twist_count)
        .map(|t| t.id.to_string())
        .collect();
    let set_piece_count = (uniform_count(&mut rng, profile.set_pieces) as usize).min(corpus::SET_PIECES.len());
    let set_piece_ids: Vec<String> = corpus::SET_PIECES
        .choose_multiple(&mut rng, set_piece_count)
        .map(|s| s.id.to_string())
        .collect();

    // 6. Constraints (weighted, without replacement).
    let constraint_count = (uniform_count(&mut rng, profile.constraints) as usize).min(corpus::CONSTRAINTS.len());
    let constraint_ids = select_constraints(&mut rng, constraint_count)?;

    // 7. Moral asymmetry.
    let moral_asymmetry = rng.gen_bool(0.3);

    // 8. Expectation violation.
    let expectation_violation = if profile.require_expectation_violation {
        let act_number = if profile.beat_profile.acts >= 2 {
            rng.gen_range(2..=profile.beat_profile.acts)
        } else {
            profile.beat_profile.acts
        };
        let kind = *[
            ExpectationViolationKind::Inversion,
            ExpectationViolationKind::Removal,
            ExpectationViolationKind::PrematureResolution,
        ]
        .choose(&mut rng)
        .unwrap();
        Some(ExpectationViolation { act_number, kind })
    } else {
        None
    };

    Ok(SeedPackage {
        map_id: map.id.to_string(),
        featured_areas,
        genre_modifier,
        perspective_bias,
        environmental_oddity,
        excluded_motifs,
        objective_id: objective.id.to_string(),
        antagonist_ids: antagonists,
        twist_ids,
        set_piece_ids,
        constraint_ids,
        moral_asymmetry,
        expectation_violation,
        // 9. Attach the profile's beat profile and combat cap.
        beat_profile_acts: profile.beat_profile.acts,
        max_combat_scenes: profile.max_combat_scenes,
    })
}

fn uniform_count(rng: &mut impl Rng, range: corpus::Range) -> u32 {
    if range.min >= range.max {
        range.min
    } else {
        rng.gen_range(range.min..=range.max)
    }
}

fn select_antagonists(
    rng: &mut impl Rng,
    count: usize,
    require_multiple_threat_categories: bool,
) -> Result<Vec<String>> {
    let mut remaining: Vec<&Antagonist> = corpus::ANTAGONISTS.iter().collect();
    let mut selected: Vec<&Antagonist> = Vec::with_capacity(count);
    let mut metaphysical_used = false;
    let mut categories_seen: Vec<ThreatCategory> = Vec::new();

    for slot in 0..count {
        let pool: Vec<&&Antagonist> = remaining
            .iter()
            .filter(|a| !(metaphysical_used && a.primary_threat_category == ThreatCategory::Metaphysical))
            .collect();
        if pool.is_empty() {
            break;
        }

        let chosen: &Antagonist = if slot == 0 && remaining.iter().any(|a| a.presence_style == PresenceStyle::Direct) {
            let direct_pool: Vec<&&Antagonist> =
                pool.iter().copied().filter(|a| a.presence_style == PresenceStyle::Direct).collect();
            **direct_pool
                .choose(rng)
                .ok_or_else(|| SeedError::SelectionFailed("no direct antagonist available for act 1".into()))?
        } else if require_multiple_threat_categories && categories_seen.len() < (count + 1) / 2 {
            let novel_pool: Vec<&&Antagonist> = pool
                .iter()
                .copied()
                .filter(|a| !categories_seen.contains(&a.primary_threat_category))
                .collect();
            if !novel_pool.is_empty() {
                **novel_pool.choose(rng).unwrap()
            } else {
                **pool.choose(rng).unwrap()
            }
        } else {
            **pool.choose(rng).unwrap()
        };

        if chosen.primary_threat_category == ThreatCategory::Metaphysical {
            metaphysical_used = true;
        }
        if !categories_seen.contains(&chosen.primary_threat_category) {
            categories_seen.push(chosen.primary_threat_category);
        }
        remaining.retain(|a| a.id != chosen.id);
        selected.push(chosen);
    }

    Ok(selected.into_iter().map(|a| a.id.to_string()).collect())
}

fn select_constraints(rng: &mut impl Rng, count: usize) -> Result<Vec<String>> {
    let mut remaining: Vec<&corpus::Constraint> = corpus::CONSTRAINTS.iter().collect();
    let mut selected = Vec::with_capacity(count);
    for _ in 0..count {
        if remaining.is_empty() {
            break;
        }
        let chosen = *remaining
            .choose_weighted(rng, |c| c.weight.max(1) as f64)
            .map_err(|e| SeedError::SelectionFailed(format!("weighted constraint draw failed: {e}")))?;
        remaining.retain(|c| c.id != chosen.id);
        selected.push(chosen.id.to_string());
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedRngSource;

    #[test]
    fn short_profile_draw_respects_size_bounds() {
        for seed in 0..50u64 {
            let pkg = draw(CampaignType::Short, &FixedRngSource(seed)).unwrap();
            assert!(pkg.antagonist_ids.len() >= 1 && pkg.antagonist_ids.len() <= 2);
            assert!(!pkg.antagonist_ids.is_empty());
            assert_eq!(pkg.beat_profile_acts, 2);
        }
    }

    #[test]
    fn short_profile_never_selects_ecological_objective() {
        for seed in 0..100u64 {
            let pkg = draw(CampaignType::Short, &FixedRngSource(seed)).unwrap();
            let objective = corpus::OBJECTIVES.iter().find(|o| o.id == pkg.objective_id).unwrap();
            assert_ne!(objective.primary_threat_category, ThreatCategory::Ecological);
        }
    }

    #[test]
    fn antagonist_selection_never_exceeds_one_metaphysical() {
        for seed in 0..100u64 {
            let pkg = draw(CampaignType::Epic, &FixedRngSource(seed)).unwrap();
            let metaphysical_count = pkg
                .antagonist_ids
                .iter()
                .filter(|id| {
                    corpus::ANTAGONISTS
                        .iter()
                        .any(|a| &a.id == id.as_str() && a.primary_threat_category == ThreatCategory::Metaphysical)
                })
                .count();
            assert!(metaphysical_count <= 1);
        }
    }

    #[test]
    fn first_antagonist_is_direct_when_any_direct_exists() {
        for seed in 0..100u64 {
            let pkg = draw(CampaignType::Long, &FixedRngSource(seed)).unwrap();
            let first = pkg.antagonist_ids.first().unwrap();
            let antagonist = corpus::ANTAGONISTS.iter().find(|a| &a.id == first).unwrap();
            assert_eq!(antagonist.presence_style, PresenceStyle::Direct);
        }
    }

    #[test]
    fn expectation_violation_present_only_when_required() {
        let pkg = draw(CampaignType::Short, &FixedRngSource(1)).unwrap();
        assert!(pkg.expectation_violation.is_none());
        let pkg = draw(CampaignType::Long, &FixedRngSource(1)).unwrap();
        assert!(pkg.expectation_violation.is_some());
    }

    #[test]
    fn variance_across_draws_produces_multiple_genre_modifiers_and_objectives() {
        use std::collections::HashSet;
        let mut genres = HashSet::new();
        let mut objectives = HashSet::new();
        for seed in 0..100u64 {
            let pkg = draw(CampaignType::Short, &FixedRngSource(seed)).unwrap();
            if let Some(g) = pkg.genre_modifier {
                genres.insert(g);
            }
            objectives.insert(pkg.objective_id);
        }
        assert!(genres.len() >= 3, "expected variance across genre modifiers, got {genres:?}");
        assert!(objectives.len() >= 3, "expected variance across objectives, got {objectives:?}");
    }
}

//! Selection on pre-specified mutation sites.
//!
//! Every selected site carries one [`SiteEffect`] per ancestry: the mutation
//! present on a block of ancestry `a` acts with selection coefficient `s_a`
//! and dominance `h_a`. Per site, an individual carrying the mutation on one
//! haplotype gets effect `h_a · s_a`; carrying it on both gets the mean of the
//! two carriers' `s`. Site effects are combined according to the configured
//! [`FitnessCombination`].
//!
//! Rules may be restricted to one subpopulation and/or one sex. When several
//! rules exist for a site the most specific one that matches applies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::base::{AncestryId, BlockArena, FitnessValue, Locus, LogFitnessValue, SiteKey};
use crate::genome::{Individual, Sex};

fn default_dominance() -> f64 {
    0.5
}

/// Selection and dominance coefficients of one site for one ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteEffect {
    pub selection: f64,
    #[serde(default = "default_dominance")]
    pub dominance: f64,
}

impl SiteEffect {
    pub fn new(selection: f64, dominance: f64) -> Self {
        Self {
            selection,
            dominance,
        }
    }
}

/// One row of the selection table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub chromosome: usize,
    pub position: Locus,
    /// Restrict the rule to one subpopulation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpopulation: Option<usize>,
    /// Restrict the rule to one sex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    /// One effect for all ancestries, or one per ancestry.
    pub effects: Vec<SiteEffect>,
}

impl SelectionEntry {
    pub fn site(&self) -> SiteKey {
        SiteKey {
            chromosome: self.chromosome,
            position: self.position,
        }
    }

    /// Effect for mutations carried on a block of `ancestry`.
    pub fn effect(&self, ancestry: AncestryId) -> SiteEffect {
        if self.effects.len() == 1 {
            self.effects[0]
        } else {
            self.effects[ancestry.index()]
        }
    }

    fn specificity(&self) -> u8 {
        2 * u8::from(self.subpopulation.is_some()) + u8::from(self.sex.is_some())
    }

    fn applies_to(&self, subpopulation: usize, sex: Sex) -> bool {
        self.subpopulation.map_or(true, |p| p == subpopulation) && self.sex.map_or(true, |s| s == sex)
    }

    /// Effect of this site on an individual whose two haplotypes carry the
    /// mutation on blocks of the given ancestries (`None` = not carried).
    pub fn genotype_effect(&self, carriers: [Option<AncestryId>; 2]) -> f64 {
        match carriers {
            [None, None] => 0.0,
            [Some(a), None] | [None, Some(a)] => {
                let effect = self.effect(a);
                effect.dominance * effect.selection
            }
            [Some(a), Some(b)] => 0.5 * (self.effect(a).selection + self.effect(b).selection),
        }
    }
}

/// How per-site effects are combined into individual fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitnessCombination {
    /// `Π max(0, 1 + e)`.
    #[default]
    Multiplicative,
    /// `exp(Σ e)`.
    LogAdditive,
}

impl FitnessCombination {
    pub fn combine<I: IntoIterator<Item = f64>>(self, effects: I) -> FitnessValue {
        match self {
            FitnessCombination::Multiplicative => effects
                .into_iter()
                .fold(FitnessValue::NEUTRAL, |fitness, e| fitness * FitnessValue::new(1.0 + e)),
            FitnessCombination::LogAdditive => effects
                .into_iter()
                .fold(LogFitnessValue::default(), |log_fitness, e| log_fitness + LogFitnessValue::new(e))
                .exp(),
        }
    }
}

/// Trait for scoring the fitness of a diploid individual.
///
/// `subpopulation` is the index of the pool the individual currently lives
/// in; site rules may depend on it.
pub trait IndividualFitness {
    fn individual_fitness(&self, arena: &BlockArena, individual: &Individual, subpopulation: usize) -> FitnessValue;
}

/// The selection table, indexed by site.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    rules: BTreeMap<SiteKey, Vec<SelectionEntry>>,
    combination: FitnessCombination,
}

impl SelectionModel {
    pub fn new(entries: &[SelectionEntry], combination: FitnessCombination) -> Self {
        let mut rules: BTreeMap<SiteKey, Vec<SelectionEntry>> = BTreeMap::new();
        for entry in entries {
            rules.entry(entry.site()).or_default().push(entry.clone());
        }
        Self { rules, combination }
    }

    /// True when no site is under selection; every individual has fitness 1.
    pub fn is_neutral(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn combination(&self) -> FitnessCombination {
        self.combination
    }

    pub fn contains(&self, site: &SiteKey) -> bool {
        self.rules.contains_key(site)
    }

    /// All selected sites, in order.
    pub fn sites(&self) -> impl Iterator<Item = SiteKey> + '_ {
        self.rules.keys().copied()
    }

    /// Selected sites on one chromosome, in position order.
    pub fn sites_on(&self, chromosome: usize) -> impl Iterator<Item = Locus> + '_ {
        self.rules
            .keys()
            .filter(move |site| site.chromosome == chromosome)
            .map(|site| site.position)
    }

    /// The most specific rule for `site` that applies to an individual of
    /// `sex` in `subpopulation`.
    pub fn rule_for(&self, site: &SiteKey, subpopulation: usize, sex: Sex) -> Option<&SelectionEntry> {
        self.rules
            .get(site)?
            .iter()
            .filter(|rule| rule.applies_to(subpopulation, sex))
            .max_by_key(|rule| rule.specificity())
    }

    /// Carrier ancestries per carried site for both haplotypes.
    pub fn carriers(arena: &BlockArena, individual: &Individual) -> BTreeMap<SiteKey, [Option<AncestryId>; 2]> {
        let mut carriers: BTreeMap<SiteKey, [Option<AncestryId>; 2]> = BTreeMap::new();
        let (h1, h2) = individual.haplotypes();
        for (copy, haplotype) in [h1, h2].into_iter().enumerate() {
            for (chromosome, chrom) in haplotype.iter().enumerate() {
                for block in chrom.iter_blocks(arena) {
                    for &position in block.mutations() {
                        carriers.entry(SiteKey { chromosome, position }).or_default()[copy] =
                            Some(block.ancestry());
                    }
                }
            }
        }
        carriers
    }
}

impl IndividualFitness for SelectionModel {
    fn individual_fitness(&self, arena: &BlockArena, individual: &Individual, subpopulation: usize) -> FitnessValue {
        if self.is_neutral() {
            return FitnessValue::NEUTRAL;
        }
        let carriers = Self::carriers(arena, individual);
        let sex = individual.sex();
        self.combination.combine(carriers.iter().filter_map(|(site, &genotype)| {
            self.rule_for(site, subpopulation, sex)
                .map(|rule| rule.genotype_effect(genotype))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::AncestryBlock;
    use crate::genome::{Chromosome, Haplotype};

    fn entry(position: f64, effects: &[(f64, f64)]) -> SelectionEntry {
        SelectionEntry {
            chromosome: 0,
            position: Locus::new(position),
            subpopulation: None,
            sex: None,
            effects: effects.iter().map(|&(s, h)| SiteEffect::new(s, h)).collect(),
        }
    }

    fn haplotype(arena: &mut BlockArena, ancestry: u16, mutations: &[f64]) -> Haplotype {
        let mutations: Vec<Locus> = mutations.iter().copied().map(Locus::new).collect();
        let id = arena.allocate(AncestryBlock::new(0.0, 1.0, AncestryId::new(ancestry), mutations));
        [Chromosome::founder(id)].into_iter().collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_neutral_model() {
        let mut arena = BlockArena::new();
        let model = SelectionModel::default();
        let h1 = haplotype(&mut arena, 0, &[0.5]);
        let h2 = haplotype(&mut arena, 1, &[]);
        let ind = Individual::new(Sex::Male, h1, h2);
        assert!(model.is_neutral());
        assert_eq!(model.individual_fitness(&arena, &ind, 0), FitnessValue::NEUTRAL);
    }

    #[test]
    fn test_heterozygote_uses_dominance() {
        let mut arena = BlockArena::new();
        let model = SelectionModel::new(
            &[entry(0.5, &[(0.2, 0.25), (0.4, 1.0)])],
            FitnessCombination::Multiplicative,
        );

        let h1 = haplotype(&mut arena, 0, &[0.5]);
        let h2 = haplotype(&mut arena, 1, &[]);
        let ind = Individual::new(Sex::Female, h1, h2);
        assert!(approx(model.individual_fitness(&arena, &ind, 0).get(), 1.05));

        let h1 = haplotype(&mut arena, 0, &[]);
        let h2 = haplotype(&mut arena, 1, &[0.5]);
        let ind = Individual::new(Sex::Female, h1, h2);
        assert!(approx(model.individual_fitness(&arena, &ind, 0).get(), 1.4));
    }

    #[test]
    fn test_homozygote_averages_selection() {
        let mut arena = BlockArena::new();
        let model = SelectionModel::new(
            &[entry(0.5, &[(0.2, 0.0), (0.4, 0.0)])],
            FitnessCombination::Multiplicative,
        );
        let h1 = haplotype(&mut arena, 0, &[0.5]);
        let h2 = haplotype(&mut arena, 1, &[0.5]);
        let ind = Individual::new(Sex::Male, h1, h2);
        assert!(approx(model.individual_fitness(&arena, &ind, 0).get(), 1.3));
    }

    #[test]
    fn test_combination_rules() {
        let effects = [0.1, -0.2];
        let mult = FitnessCombination::Multiplicative.combine(effects);
        let log = FitnessCombination::LogAdditive.combine(effects);
        assert!(approx(mult.get(), 1.1 * 0.8));
        assert!(approx(log.get(), (-0.1f64).exp()));

        let lethal = FitnessCombination::Multiplicative.combine([-1.5]);
        assert!(lethal.is_lethal());
    }

    #[test]
    fn test_log_additive_sums_in_log_space() {
        assert_eq!(FitnessCombination::LogAdditive.combine(std::iter::empty()), FitnessValue::NEUTRAL);
        assert_eq!(FitnessCombination::Multiplicative.combine(std::iter::empty()), FitnessValue::NEUTRAL);

        // A strongly deleterious site lowers fitness but never makes it lethal.
        let log = FitnessCombination::LogAdditive.combine([-3.0, 0.5]);
        assert!(!log.is_lethal());
        assert!(approx(log.ln().get(), -2.5));
    }

    #[test]
    fn test_single_effect_broadcasts() {
        let rule = entry(0.5, &[(0.3, 0.5)]);
        assert_eq!(rule.effect(AncestryId::new(0)), rule.effect(AncestryId::new(4)));
    }

    #[test]
    fn test_rule_for_prefers_most_specific() {
        let mut general = entry(0.5, &[(0.1, 0.5)]);
        general.subpopulation = None;
        let mut by_sex = general.clone();
        by_sex.sex = Some(Sex::Female);
        by_sex.effects = vec![SiteEffect::new(0.2, 0.5)];
        let mut by_pop = general.clone();
        by_pop.subpopulation = Some(1);
        by_pop.effects = vec![SiteEffect::new(0.3, 0.5)];

        let model = SelectionModel::new(
            &[general, by_sex, by_pop],
            FitnessCombination::Multiplicative,
        );
        let site = SiteKey::new(0, 0.5);

        let pick = |pop, sex| model.rule_for(&site, pop, sex).map(|r| r.effects[0].selection);
        assert_eq!(pick(0, Sex::Male), Some(0.1));
        assert_eq!(pick(0, Sex::Female), Some(0.2));
        assert_eq!(pick(1, Sex::Female), Some(0.3));
        assert_eq!(pick(1, Sex::Male), Some(0.3));
    }

    #[test]
    fn test_restricted_rule_is_neutral_elsewhere() {
        let mut arena = BlockArena::new();
        let mut rule = entry(0.5, &[(0.5, 1.0)]);
        rule.subpopulation = Some(1);
        let model = SelectionModel::new(&[rule], FitnessCombination::Multiplicative);

        let h1 = haplotype(&mut arena, 0, &[0.5]);
        let h2 = haplotype(&mut arena, 0, &[]);
        let ind = Individual::new(Sex::Male, h1, h2);
        assert_eq!(model.individual_fitness(&arena, &ind, 0), FitnessValue::NEUTRAL);
        assert!(approx(model.individual_fitness(&arena, &ind, 1).get(), 1.5));
    }

    #[test]
    fn test_sites_on_chromosome() {
        let mut other = entry(0.1, &[(0.1, 0.5)]);
        other.chromosome = 1;
        let model = SelectionModel::new(
            &[entry(0.7, &[(0.1, 0.5)]), entry(0.2, &[(0.1, 0.5)]), other],
            FitnessCombination::LogAdditive,
        );
        let on_first: Vec<f64> = model.sites_on(0).map(Locus::get).collect();
        assert_eq!(on_first, vec![0.2, 0.7]);
        assert_eq!(model.sites().count(), 3);
        assert!(model.contains(&SiteKey::new(1, 0.1)));
    }
}

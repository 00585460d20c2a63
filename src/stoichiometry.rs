use std::collections::HashMap;

use crate::KineticsError;

/// Static description of one reaction: a pure (state-independent) rate plus
/// reactant and product coefficient lists.
///
/// Reactants and products are encoded as ordered `(species, coefficient)`
/// pairs. For example `reactants = [(0, 1), (2, 3)]`, `products = [(0, 2),
/// (3, 1)]` corresponds to `A + 3C -> 2A + D`. Immutable after construction.
#[derive(Clone, Debug)]
pub struct Stoichiometry {
    reaction_rate: f64,
    reactants: Vec<(usize, usize)>,
    products: Vec<(usize, usize)>,
    reactant_map: HashMap<usize, usize>,
    product_map: HashMap<usize, usize>,
}

impl Stoichiometry {
    /// Validates and builds a reaction definition.
    ///
    /// Fails when the rate is negative or non-finite, a coefficient is zero,
    /// or a species index appears twice on the same side of the reaction.
    pub fn new(
        reaction_rate: f64,
        reactants: Vec<(usize, usize)>,
        products: Vec<(usize, usize)>,
    ) -> Result<Self, KineticsError> {
        if !reaction_rate.is_finite() || reaction_rate < 0.0 {
            return Err(KineticsError::Stoichiometry(format!(
                "reaction rate {} must be finite and non-negative",
                reaction_rate
            )));
        }
        let reactant_map = build_coefficient_map(&reactants, "reactant")?;
        let product_map = build_coefficient_map(&products, "product")?;
        Ok(Self {
            reaction_rate,
            reactants,
            products,
            reactant_map,
            product_map,
        })
    }

    pub fn reaction_rate(&self) -> f64 {
        self.reaction_rate
    }

    /// Ordered `(species, coefficient)` pairs consumed by the reaction.
    pub fn reactants(&self) -> &[(usize, usize)] {
        &self.reactants
    }

    /// Ordered `(species, coefficient)` pairs produced by the reaction.
    pub fn products(&self) -> &[(usize, usize)] {
        &self.products
    }

    /// Stoichiometric coefficient of a reactant species, `None` if the
    /// species is not consumed by this reaction.
    pub fn reactant_coefficient(&self, species: usize) -> Option<usize> {
        self.reactant_map.get(&species).copied()
    }

    /// Stoichiometric coefficient of a product species, `None` if the
    /// species is not produced by this reaction.
    pub fn product_coefficient(&self, species: usize) -> Option<usize> {
        self.product_map.get(&species).copied()
    }
}

fn build_coefficient_map(
    pairs: &[(usize, usize)],
    side: &str,
) -> Result<HashMap<usize, usize>, KineticsError> {
    let mut map = HashMap::with_capacity(pairs.len());
    for &(species, coefficient) in pairs {
        if coefficient == 0 {
            return Err(KineticsError::Stoichiometry(format!(
                "{} coefficient for species {} must be positive",
                side, species
            )));
        }
        if map.insert(species, coefficient).is_some() {
            return Err(KineticsError::Stoichiometry(format!(
                "species {} appears more than once among {}s",
                species, side
            )));
        }
    }
    Ok(map)
}

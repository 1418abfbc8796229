//! Genetic operators over attraction chromosomes.
//!
//! All operators work on bare `Vec<usize>` chromosomes whose genes are
//! unique catalog indices; transport modes are re-derived by the caller
//! after the chromosome is reassembled.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::MAX_ROUTE_LEN;

/// Segment-based crossover for variable-length chromosomes.
///
/// Copies a random two-cut segment of parent 1, fills the remainder in
/// parent 2's order skipping genes already present, tops up from parent 1,
/// and finally from randomly shuffled unseen genes. The child length is
/// sampled between the parents' lengths, capped at [`MAX_ROUTE_LEN`].
pub fn crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    catalog_len: usize,
    rng: &mut R,
) -> Vec<usize> {
    if parent1.is_empty() {
        return parent2.to_vec();
    }
    if parent2.is_empty() {
        return parent1.to_vec();
    }

    let min_len = parent1.len().min(parent2.len());
    let max_len = parent1.len().max(parent2.len()).min(MAX_ROUTE_LEN);
    let target = if min_len >= max_len {
        max_len
    } else {
        rng.random_range(min_len..=max_len)
    };

    let mut cut1 = rng.random_range(0..parent1.len());
    let mut cut2 = rng.random_range(0..parent1.len());
    if cut1 > cut2 {
        std::mem::swap(&mut cut1, &mut cut2);
    }

    let mut included = vec![false; catalog_len];
    let mut child = Vec::with_capacity(target);

    for &gene in &parent1[cut1..=cut2] {
        if child.len() >= target {
            break;
        }
        child.push(gene);
        included[gene] = true;
    }
    for &gene in parent2 {
        if child.len() >= target {
            break;
        }
        if !included[gene] {
            child.push(gene);
            included[gene] = true;
        }
    }
    for (i, &gene) in parent1.iter().enumerate() {
        if child.len() >= target {
            break;
        }
        if (cut1..=cut2).contains(&i) || included[gene] {
            continue;
        }
        child.push(gene);
        included[gene] = true;
    }
    if child.len() < target {
        let mut unseen: Vec<usize> = (0..catalog_len).filter(|&g| !included[g]).collect();
        unseen.shuffle(rng);
        for gene in unseen {
            if child.len() >= target {
                break;
            }
            child.push(gene);
        }
    }

    child
}

/// Applies one of the three mutation moves, chosen uniformly.
///
/// Chromosomes shorter than two genes are left untouched; growth for
/// those comes from crossover.
pub fn mutate<R: Rng>(genes: &mut Vec<usize>, catalog_len: usize, rng: &mut R) {
    if genes.len() < 2 {
        return;
    }
    match rng.random_range(0..3) {
        0 => swap_mutation(genes, rng),
        1 => move_mutation(genes, rng),
        _ => add_remove_mutation(genes, catalog_len, rng),
    }
}

/// Swaps two distinct positions.
fn swap_mutation<R: Rng>(genes: &mut [usize], rng: &mut R) {
    let a = rng.random_range(0..genes.len());
    let mut b = rng.random_range(0..genes.len());
    while b == a {
        b = rng.random_range(0..genes.len());
    }
    genes.swap(a, b);
}

/// Moves one gene to a new position.
fn move_mutation<R: Rng>(genes: &mut Vec<usize>, rng: &mut R) {
    let from = rng.random_range(0..genes.len());
    let to = rng.random_range(0..genes.len());
    if from == to {
        return;
    }
    let gene = genes.remove(from);
    genes.insert(to.min(genes.len()), gene);
}

/// Adds an unseen gene at a random position, or removes a random one —
/// a fair coin, constrained by the size bounds.
fn add_remove_mutation<R: Rng>(genes: &mut Vec<usize>, catalog_len: usize, rng: &mut R) {
    let can_grow = genes.len() < MAX_ROUTE_LEN.min(catalog_len);
    if can_grow && rng.random_bool(0.5) {
        // Unique genes shorter than the catalog guarantee an unseen one.
        let unseen: Vec<usize> = (0..catalog_len).filter(|g| !genes.contains(g)).collect();
        let gene = unseen[rng.random_range(0..unseen.len())];
        let pos = rng.random_range(0..=genes.len());
        genes.insert(pos, gene);
    } else if genes.len() > 1 {
        let pos = rng.random_range(0..genes.len());
        genes.remove(pos);
    }
}

// ============================================================================
// Tests
// ============================================================================

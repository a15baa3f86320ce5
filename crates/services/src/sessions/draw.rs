use rand::Rng;
use rand::seq::SliceRandom;

use exam_core::model::QuestionId;

/// Draw the ordered question subset for one session.
///
/// Copies the exam's pool, shuffles it (Fisher–Yates, every permutation
/// equally likely), and truncates to `display_count` when that cap is
/// positive and strictly smaller than the pool. Each call draws
/// independently, so two students sitting the same exam see their own
/// subset in their own order.
#[must_use]
pub fn draw_question_set<R: Rng + ?Sized>(
    pool: &[QuestionId],
    display_count: Option<u32>,
    rng: &mut R,
) -> Vec<QuestionId> {
    let mut drawn = pool.to_vec();
    drawn.shuffle(rng);

    if let Some(cap) = display_count {
        let cap = usize::try_from(cap).unwrap_or(usize::MAX);
        if cap > 0 && cap < drawn.len() {
            drawn.truncate(cap);
        }
    }

    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn build_pool(len: usize) -> Vec<QuestionId> {
        (0..len).map(|_| QuestionId::new()).collect()
    }

    #[test]
    fn draw_respects_the_cap() {
        let pool = build_pool(10);
        let mut rng = StdRng::seed_from_u64(7);

        let drawn = draw_question_set(&pool, Some(4), &mut rng);
        assert_eq!(drawn.len(), 4);

        let pool_set: HashSet<_> = pool.iter().copied().collect();
        let drawn_set: HashSet<_> = drawn.iter().copied().collect();
        assert_eq!(drawn_set.len(), drawn.len(), "no duplicates");
        assert!(drawn_set.is_subset(&pool_set));
    }

    #[test]
    fn no_cap_keeps_the_whole_pool() {
        let pool = build_pool(6);
        let mut rng = StdRng::seed_from_u64(7);

        for cap in [None, Some(0), Some(6), Some(100)] {
            let drawn = draw_question_set(&pool, cap, &mut rng);
            assert_eq!(drawn.len(), 6, "cap {cap:?} must keep the full pool");
            let drawn_set: HashSet<_> = drawn.iter().copied().collect();
            assert_eq!(drawn_set.len(), 6);
        }
    }

    #[test]
    fn empty_pool_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(draw_question_set(&[], Some(5), &mut rng).is_empty());
    }

    #[test]
    fn draws_are_independent_between_sessions() {
        let pool = build_pool(30);
        let mut rng = rand::rng();

        // with 30! orderings, 20 identical consecutive draws would mean the
        // shuffle is broken rather than unlucky
        let mut any_difference = false;
        for _ in 0..20 {
            let first = draw_question_set(&pool, None, &mut rng);
            let second = draw_question_set(&pool, None, &mut rng);
            if first != second {
                any_difference = true;
                break;
            }
        }
        assert!(any_difference);
    }

    #[test]
    fn capped_draws_vary_in_membership_over_many_trials() {
        let pool = build_pool(20);
        let mut rng = rand::rng();

        let mut seen: HashSet<Vec<QuestionId>> = HashSet::new();
        for _ in 0..20 {
            let mut drawn = draw_question_set(&pool, Some(5), &mut rng);
            drawn.sort();
            seen.insert(drawn);
        }
        // 20 draws of C(20,5) possible subsets should essentially never agree
        assert!(seen.len() > 1);
    }
}

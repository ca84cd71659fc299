use crate::models::types::{Card, TOKEN_SIZE};

/// Number of values a single feature can take.
const FEATURE_VALUES: Card = 3;

/// Checks whether three cards form a legal set.
///
/// Each card is read as base-3 digits, one digit per feature. On every feature the
/// three digits must be either all equal or all distinct. Digits past the highest
/// one of the largest card are zero for all three and always pass.
pub fn is_set(card1: Card, card2: Card, card3: Card) -> bool {
    let (mut a, mut b, mut c) = (card1, card2, card3);
    while a > 0 || b > 0 || c > 0 {
        let (x, y, z) = (a % FEATURE_VALUES, b % FEATURE_VALUES, c % FEATURE_VALUES);
        let all_equal = x == y && y == z;
        let all_distinct = x != y && y != z && x != z;
        if !all_equal && !all_distinct {
            return false;
        }

        a /= FEATURE_VALUES;
        b /= FEATURE_VALUES;
        c /= FEATURE_VALUES;
    }

    true
}

/// Finds up to `limit` legal sets among `cards`, in index order.
pub fn find_sets(cards: &[Card], limit: usize) -> Vec<[Card; TOKEN_SIZE]> {
    let mut sets = Vec::new();
    if limit == 0 {
        return sets;
    }

    for i in 0..cards.len() {
        for j in (i + 1)..cards.len() {
            for k in (j + 1)..cards.len() {
                if is_set(cards[i], cards[j], cards[k]) {
                    sets.push([cards[i], cards[j], cards[k]]);
                    if sets.len() == limit {
                        return sets;
                    }
                }
            }
        }
    }

    sets
}

/// True when at least one legal set exists among `cards`.
pub fn contains_set(cards: &[Card]) -> bool {
    !find_sets(cards, 1).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_distinct_first_feature() {
        // 0, 1, 2 differ only in the lowest digit, where they are all distinct.
        assert!(is_set(0, 1, 2));
    }

    #[test]
    fn test_mixed_feature_is_rejected() {
        // Lowest digits 0, 1, 0.
        assert!(!is_set(0, 1, 3));
    }

    #[test]
    fn test_every_feature_distinct() {
        // 0 = 0000, 40 = 1111, 80 = 2222
        assert!(is_set(0, 40, 80));
    }

    #[test]
    fn test_higher_feature_breaks_the_set() {
        // Lowest digit all equal (1), second digit 0, 1, 1.
        assert!(!is_set(1, 4, 13));
    }

    #[test]
    fn test_symmetric_and_deterministic() {
        for a in 0..27 {
            for b in 0..27 {
                for c in 0..27 {
                    let expected = is_set(a, b, c);
                    assert_eq!(is_set(a, c, b), expected);
                    assert_eq!(is_set(b, a, c), expected);
                    assert_eq!(is_set(b, c, a), expected);
                    assert_eq!(is_set(c, a, b), expected);
                    assert_eq!(is_set(c, b, a), expected);
                    assert_eq!(is_set(a, b, c), expected);
                }
            }
        }
    }

    #[test]
    fn test_any_two_cards_complete_exactly_one_set() {
        let deck: Vec<Card> = (0..81).collect();
        for a in 0..81u32 {
            for b in (a + 1)..81 {
                let completions = deck
                    .iter()
                    .filter(|&&c| c != a && c != b && is_set(a, b, c))
                    .count();
                assert_eq!(completions, 1, "cards {a} and {b}");
            }
        }
    }

    #[test]
    fn test_find_sets_respects_limit() {
        let deck: Vec<Card> = (0..9).collect();
        assert_eq!(find_sets(&deck, 1), vec![[0, 1, 2]]);
        assert_eq!(find_sets(&deck, 100).len(), 12);
        assert!(find_sets(&deck, 0).is_empty());
    }

    #[test]
    fn test_no_set_among_cap() {
        // 0 = 00, 1 = 01, 3 = 10, 4 = 11: every triple mixes a digit.
        assert!(!contains_set(&[0, 1, 3, 4]));
        assert!(!contains_set(&[0, 1]));
        assert!(contains_set(&[4, 0, 1, 2]));
    }
}

use axiomind_holdem::cards::{parse_cards, Card};
use axiomind_holdem::hand::{evaluate, evaluate_hand, winning_seats, Category, HandEvaluation};

fn hand(s: &str) -> HandEvaluation {
    let cards: [Card; 7] = parse_cards(s).unwrap().try_into().unwrap();
    evaluate_hand(&cards)
}

fn board(s: &str) -> [Card; 5] {
    parse_cards(s).unwrap().try_into().unwrap()
}

#[test]
fn ace_king_of_spades_make_royal_flush() {
    let hole = [Card::from_code(51).unwrap(), Card::from_code(50).unwrap()];
    let e = evaluate(hole, &board("Qs Js Ts 2c 7d"));
    assert_eq!(e.category, Category::RoyalFlush);
}

#[test]
fn categories_rank_in_standard_order() {
    let ladder = [
        ("Ah Kd 9c 7s 5h 3c 2d", Category::HighCard),
        ("2h 2d 9c 7s 5h 3c Kd", Category::OnePair),
        ("2h 2d 9c 9s 5h 3c Kd", Category::TwoPair),
        ("2h 2d 2c 9s 5h 3c Kd", Category::ThreeOfAKind),
        ("2h 3d 4c 5s 6h Jc Kd", Category::Straight),
        ("2h 5h 8h Jh Kh 3c 4d", Category::Flush),
        ("2h 2d 2c 9s 9h 3c Kd", Category::FullHouse),
        ("2h 2d 2c 2s 9h 3c Kd", Category::FourOfAKind),
        ("5h 6h 7h 8h 9h 2c Kd", Category::StraightFlush),
        ("Th Jh Qh Kh Ah 2c 3d", Category::RoyalFlush),
    ];
    let evals: Vec<HandEvaluation> = ladder
        .iter()
        .map(|(cards, category)| {
            let e = hand(cards);
            assert_eq!(e.category, *category, "{cards}");
            e
        })
        .collect();
    for pair in evals.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn wheel_is_the_lowest_straight() {
    let wheel = hand("Ah 2d 3c 4s 5h 9c Kd");
    let six_high = hand("2h 3d 4c 5s 6h 9c Kd");
    assert_eq!(wheel.category, Category::Straight);
    assert!(wheel < six_high);
}

#[test]
fn steel_wheel_is_a_straight_flush_not_royal() {
    let e = hand("Ah 2h 3h 4h 5h Kc Kd");
    assert_eq!(e.category, Category::StraightFlush);
    assert!(e < hand("2h 3h 4h 5h 6h Kc Kd"));
}

#[test]
fn flush_beats_the_straight_in_the_same_cards() {
    assert_eq!(hand("4h 5h 6h 7h 9h 8c 2d").category, Category::Flush);
}

#[test]
fn kickers_break_pair_ties() {
    assert!(hand("Ah Ad Kc 9s 7h 3c 2d") > hand("Ah Ad Qc 9s 7h 3c 2d"));
    // fifth card decides high card
    assert!(hand("Ah Kd 9c 7s 5h 3c 2d") > hand("Ah Kd 9c 7s 4h 3c 2d"));
}

#[test]
fn third_pair_can_be_the_two_pair_kicker() {
    let a = hand("Kh Kd 9c 9s 5h 5c 2d");
    let b = hand("Kh Kd 9c 9s 4h 4c 2d");
    assert_eq!(a.category, Category::TwoPair);
    assert!(a > b);
    // a lone high card outranks the third pair as kicker
    assert!(hand("Kh Kd 9c 9s 5h 5c Ad") > a);
}

#[test]
fn two_trips_make_a_full_house() {
    let a = hand("Kh Kd Kc 9s 9h 9c 2d");
    assert_eq!(a.category, Category::FullHouse);
    assert!(a > hand("Kh Kd Kc 8s 8h 2c 3d"));
    assert!(a < hand("Ah Ad Ac 2s 2h 4c 5d"));
}

#[test]
fn board_that_plays_splits() {
    let b = board("Th Jd Qc Ks Ad");
    let hole_a = parse_cards("2c 3d").unwrap();
    let hole_b = parse_cards("4c 5h").unwrap();
    let a = evaluate([hole_a[0], hole_a[1]], &b);
    let c = evaluate([hole_b[0], hole_b[1]], &b);
    assert_eq!(a, c);
    assert_eq!(winning_seats(&[(0, a), (3, c)]), vec![0, 3]);
}

#[test]
fn evaluation_ignores_card_order() {
    let cards: Vec<Card> = parse_cards("9s 9h 2c Kd 9c 5h Ks").unwrap();
    let mut reversed = cards.clone();
    reversed.reverse();
    let a: [Card; 7] = cards.try_into().unwrap();
    let b: [Card; 7] = reversed.try_into().unwrap();
    assert_eq!(evaluate_hand(&a), evaluate_hand(&b));
    assert_eq!(evaluate_hand(&a).category, Category::FullHouse);
}

//! End-to-end engine behaviour: search, allocation, classification, records.

mod support;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::market::{make_market, make_prop_market};
use surebet::domain::{
    allocate_stakes, decimal_to_american, find_best_combination, group_player_props,
    has_arbitrage, implied_probability, profit_percentage, ConfidenceConfig, Detector,
    DomainError, EngineConfig, Odds, RecordView, SearchCriteria, WarningLevel,
};

fn odds(values: &[Decimal]) -> Vec<Odds> {
    values.iter().map(|v| Odds::try_new(*v).unwrap()).collect()
}

#[test]
fn two_way_arbitrage_end_to_end() {
    let market = make_market(
        "m1",
        &[("BookX", "A", dec!(2.10)), ("BookY", "B", dec!(2.20))],
    );
    let record = Detector::default().detect_market(&market).unwrap().unwrap();

    assert_eq!(record.profit_percentage().round_dp(2), dec!(7.44));
    assert_eq!(record.implied_probability().round_dp(4), dec!(0.9307));

    let stakes = record.allocation().stakes();
    assert_eq!(stakes.iter().sum::<Decimal>(), dec!(1000));
    let payout_a = stakes[0] * dec!(2.10);
    let payout_b = stakes[1] * dec!(2.20);
    assert!((payout_a - payout_b).abs() <= dec!(0.02));
    assert_eq!(record.guaranteed_profit(), dec!(74.42));
}

#[test]
fn no_arbitrage_yields_no_record() {
    let market = make_market(
        "m1",
        &[("BookX", "A", dec!(1.80)), ("BookY", "B", dec!(1.90))],
    );
    assert!(Detector::default().detect_market(&market).unwrap().is_none());
}

#[test]
fn three_way_negative_control() {
    let market = make_market(
        "m3",
        &[
            ("BookX", "Win", dec!(3.20)),
            ("BookY", "Draw", dec!(3.40)),
            ("BookZ", "Loss", dec!(2.50)),
        ],
    );
    assert!(Detector::default().detect_market(&market).unwrap().is_none());
}

#[test]
fn invalid_quote_is_excluded_without_aborting() {
    let market = make_market(
        "m1",
        &[
            ("Broken", "A", dec!(0.5)),
            ("BookX", "A", dec!(2.10)),
            ("BookY", "B", dec!(2.20)),
        ],
    );
    let record = Detector::default().detect_market(&market).unwrap().unwrap();
    assert_eq!(record.legs()[0].source().as_str(), "BookX");

    assert!(matches!(
        Odds::try_new(dec!(0.5)),
        Err(DomainError::InvalidOdds { .. })
    ));
}

#[test]
fn classifier_scenarios() {
    let config = ConfidenceConfig::default();
    assert_eq!(config.level_for_profit(dec!(20)), WarningLevel::Critical);
    assert_eq!(config.level_for_profit(dec!(8)), WarningLevel::Moderate);
}

#[test]
fn exact_one_is_not_arbitrage() {
    for prices in [
        odds(&[dec!(2), dec!(2)]),
        odds(&[dec!(3), dec!(3), dec!(3)]),
        odds(&[dec!(4), dec!(4), dec!(2)]),
    ] {
        assert_eq!(implied_probability(&prices).unwrap(), Decimal::ONE);
        assert!(!has_arbitrage(&prices));
        assert!(profit_percentage(&prices).is_err());
    }
}

#[test]
fn arbitrage_implies_positive_profit() {
    for prices in [
        odds(&[dec!(2.05), dec!(2.05)]),
        odds(&[dec!(3.5), dec!(3.6), dec!(3.7)]),
        odds(&[dec!(1.5), dec!(3.2)]),
    ] {
        assert!(implied_probability(&prices).unwrap() < Decimal::ONE);
        assert!(has_arbitrage(&prices));
        assert!(profit_percentage(&prices).unwrap() > Decimal::ZERO);
    }
}

#[test]
fn stakes_equalise_payouts_and_sum_to_total() {
    let cases = [
        (odds(&[dec!(2.10), dec!(2.20)]), dec!(1000)),
        (odds(&[dec!(3.5), dec!(3.6), dec!(3.7)]), dec!(250)),
        (odds(&[dec!(1.5), dec!(3.2)]), dec!(99.99)),
    ];
    for (prices, total) in cases {
        let stakes = allocate_stakes(&prices, total).unwrap();
        assert_eq!(stakes.iter().sum::<Decimal>(), total);

        let payouts: Vec<Decimal> = stakes
            .iter()
            .zip(&prices)
            .map(|(s, p)| *s * p.value())
            .collect();
        let max = payouts.iter().max().unwrap();
        let min = payouts.iter().min().unwrap();
        // Cent rounding moves each payout by a few cents at most.
        assert!(*max - *min <= dec!(0.10), "payouts diverge: {payouts:?}");
    }
}

#[test]
fn search_is_idempotent_and_deterministic() {
    let market = make_market(
        "m1",
        &[
            ("BookX", "A", dec!(2.10)),
            ("BookY", "A", dec!(2.10)),
            ("BookZ", "B", dec!(2.15)),
            ("BookW", "B", dec!(2.15)),
        ],
    );
    let first = find_best_combination(&market, &SearchCriteria::default())
        .unwrap()
        .unwrap();
    for _ in 0..5 {
        let again = find_best_combination(&market, &SearchCriteria::default())
            .unwrap()
            .unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(first.legs()[0].source().as_str(), "BookX");
    assert_eq!(first.legs()[1].source().as_str(), "BookZ");

    let detector = Detector::default();
    assert_eq!(
        detector.detect_market(&market).unwrap(),
        detector.detect_market(&market).unwrap()
    );
}

#[test]
fn three_way_arbitrage_allocates_residual_to_last() {
    let market = make_market(
        "m3",
        &[
            ("BookX", "Home", dec!(3.40)),
            ("BookY", "Draw", dec!(3.60)),
            ("BookZ", "Away", dec!(3.20)),
        ],
    );
    let record = Detector::default().detect_market(&market).unwrap().unwrap();
    let stakes = record.allocation().stakes();

    assert_eq!(stakes.len(), 3);
    assert_eq!(stakes.iter().sum::<Decimal>(), dec!(1000));
    assert_eq!(stakes[0], stakes[0].round_dp(2));
    assert_eq!(stakes[1], stakes[1].round_dp(2));
}

#[test]
fn shared_source_raises_warning() {
    let market = make_market(
        "m1",
        &[("BookX", "A", dec!(2.05)), ("BookX", "B", dec!(2.05))],
    );
    let record = Detector::default().detect_market(&market).unwrap().unwrap();
    // 2.5% alone is verify_odds; one source on both sides escalates it.
    assert_eq!(record.warning().level, WarningLevel::Moderate);
}

#[test]
fn batch_scan_sorts_and_partitions() {
    let markets = vec![
        make_prop_market("p1", "LeBron James", "player_points", dec!(25.5), dec!(2.05), dec!(2.05)),
        make_market("g1", &[("BookX", "A", dec!(2.10)), ("BookY", "B", dec!(2.20))]),
        make_prop_market("p2", "LeBron James", "player_points", dec!(26.5), dec!(2.10), dec!(2.00)),
        make_market("g2", &[("BookX", "A", dec!(1.80)), ("BookY", "B", dec!(1.90))]),
    ];
    let detector = Detector::new(
        EngineConfig {
            total_stake: dec!(100),
            ..EngineConfig::default()
        },
        ConfidenceConfig::default(),
    );

    let records = detector.scan(&markets);
    let ids: Vec<_> = records.iter().map(|r| r.market_id().as_str()).collect();
    assert_eq!(ids, vec!["g1", "p1", "p2"]);

    assert_eq!(RecordView::Game.select(&records).len(), 1);
    assert_eq!(RecordView::PlayerProp.select(&records).len(), 2);

    let groups = group_player_props(&records);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].records.len(), 2);
}

#[test]
fn american_display_conversion() {
    assert_eq!(decimal_to_american(dec!(2.50)).unwrap(), "+150");
    assert_eq!(decimal_to_american(dec!(1.50)).unwrap(), "-200");
    assert!(matches!(
        decimal_to_american(Decimal::ONE),
        Err(DomainError::InvalidOdds { .. })
    ));
    assert!(decimal_to_american(dec!(0.9)).is_err());
}

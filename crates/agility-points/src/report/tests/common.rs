use chrono::NaiveDate;

use crate::config::{ReportOptions, ScoringOptions};
use crate::filter::VisibilityFilterState;
use crate::report::{PointsReport, PointsReportBuilder};
use crate::scoring::domain::{
    Club, Dog, ExistingPointKind, ExistingPoints, OtherPointsAward, Partner, QStatus,
    RegistrationNumber, Run, Title, Trial,
};
use crate::scoring::rules::{
    Configuration, DivisionConfig, EventConfig, LevelConfig, LifetimePoints, MultiQDefinition,
    MultiQItem, OtherPointsConfig, OtherPointsTally, PlaceValue, ScoringRule, ScoringStyle,
    TitlePoints, VenueConfig,
};

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

fn level(name: &str) -> LevelConfig {
    LevelConfig {
        name: name.to_string(),
        sub_levels: Vec::new(),
    }
}

fn titling_rule() -> ScoringRule {
    let mut rule = ScoringRule::new(ScoringStyle::FaultsThenTime);
    rule.drop_fractions = true;
    rule.title_points = vec![TitlePoints {
        faults: 0.0,
        points: 1.0,
    }];
    rule
}

fn item(event: &str) -> MultiQItem {
    MultiQItem {
        division: "Standard".to_string(),
        level: "Excellent".to_string(),
        event: event.to_string(),
    }
}

pub(super) fn configuration() -> Configuration {
    let mut jumpers = titling_rule();
    jumpers.speed_points = true;
    jumpers.place_multipliers = vec![
        PlaceValue {
            place: 1,
            value: 2.0,
        },
        PlaceValue {
            place: 0,
            value: 1.0,
        },
    ];
    jumpers.lifetime_points = vec![LifetimePoints {
        faults: 0.0,
        points: 10.0,
        use_speed_points: false,
    }];

    let mut pairs = titling_rule();
    pairs.super_q = true;

    Configuration {
        venues: vec![
            VenueConfig {
                name: "AKC".to_string(),
                url: Some("https://www.akc.org".to_string()),
                lifetime_name: None,
                divisions: vec![
                    DivisionConfig {
                        name: "Standard".to_string(),
                        levels: vec![
                            LevelConfig {
                                name: "Novice".to_string(),
                                sub_levels: vec!["Novice A".to_string(), "Novice B".to_string()],
                            },
                            level("Excellent"),
                        ],
                    },
                    DivisionConfig {
                        name: "Preferred".to_string(),
                        levels: vec![level("Excellent")],
                    },
                ],
                events: vec![
                    EventConfig {
                        name: "Standard".to_string(),
                        has_partner: false,
                        rules: vec![titling_rule()],
                    },
                    EventConfig {
                        name: "Jumpers".to_string(),
                        has_partner: false,
                        rules: vec![jumpers],
                    },
                    EventConfig {
                        name: "Pairs".to_string(),
                        has_partner: true,
                        rules: vec![pairs],
                    },
                ],
                multi_qs: vec![MultiQDefinition {
                    name: "Double Q".to_string(),
                    short_name: "QQ".to_string(),
                    valid_from: None,
                    valid_to: None,
                    items: vec![item("Standard"), item("Jumpers")],
                }],
            },
            VenueConfig {
                name: "USDAA".to_string(),
                url: None,
                lifetime_name: Some("Lifetime Achievement".to_string()),
                divisions: vec![DivisionConfig {
                    name: "Championship".to_string(),
                    levels: vec![level("Masters")],
                }],
                events: vec![EventConfig {
                    name: "Gamblers".to_string(),
                    has_partner: false,
                    rules: vec![titling_rule()],
                }],
                multi_qs: Vec::new(),
            },
        ],
        other_points: vec![
            OtherPointsConfig {
                name: "Top Ten".to_string(),
                tally: OtherPointsTally::All,
            },
            OtherPointsConfig {
                name: "Bonus".to_string(),
                tally: OtherPointsTally::LevelByEvent,
            },
        ],
    }
}

pub(super) fn run(
    day: u32,
    division: &str,
    level: &str,
    event: &str,
    judge: &str,
    q: QStatus,
) -> Run {
    let mut run = Run::new(date(5, day), division, level, event);
    run.judge = judge.to_string();
    run.q = q;
    run.scoring.time = 30.0;
    run.scoring.sct = 40.0;
    run
}

pub(super) fn existing(kind: ExistingPointKind, event: &str, on: NaiveDate, points: f64) -> ExistingPoints {
    ExistingPoints {
        kind,
        date: on,
        venue: "AKC".to_string(),
        multi_q: String::new(),
        division: "Standard".to_string(),
        level: "Excellent".to_string(),
        event: event.to_string(),
        other_points: String::new(),
        points,
    }
}

/// One AKC trial over two days plus imported title, speed and other points.
pub(super) fn dog() -> Dog {
    let standard = run(4, "Standard", "Excellent", "Standard", "Smith", QStatus::Qualified);

    let mut jumpers = run(4, "Standard", "Excellent", "Jumpers", "Jones", QStatus::Qualified);
    jumpers.scoring.time = 25.0;
    jumpers.scoring.sct = 35.0;
    jumpers.place = 1;
    jumpers.other_points = vec![OtherPointsAward {
        name: "Top Ten".to_string(),
        points: 3.0,
    }];

    let mut pairs = run(4, "Standard", "Excellent", "Pairs", "Jones", QStatus::SuperQ);
    pairs.partners = vec![Partner {
        handler: "Ann".to_string(),
        dog: "Bolt".to_string(),
        registration: "R1".to_string(),
    }];

    let mut faulted = run(5, "Standard", "Excellent", "Standard", "Smith", QStatus::NotQualified);
    faulted.scoring.course_faults = 5.0;

    let preferred = run(5, "Preferred", "Excellent", "Standard", "Baker", QStatus::Qualified);

    let mut top_ten = existing(ExistingPointKind::OtherPoints, "", date(1, 20), 2.0);
    top_ten.other_points = "Top Ten".to_string();

    Dog {
        call_name: "Pip".to_string(),
        registered_name: "Pip's Wild Ride".to_string(),
        registration_numbers: vec![RegistrationNumber {
            venue: "AKC".to_string(),
            number: "MA123".to_string(),
        }],
        titles: vec![
            Title {
                venue: "AKC".to_string(),
                name: "MX".to_string(),
                date: Some(date(3, 1)),
                hidden: false,
                received: true,
            },
            Title {
                venue: "AKC".to_string(),
                name: "MXJ".to_string(),
                date: Some(date(3, 2)),
                hidden: true,
                received: false,
            },
        ],
        existing_points: vec![
            existing(ExistingPointKind::Title, "Standard", date(1, 10), 5.0),
            existing(ExistingPointKind::Speed, "", date(2, 1), 30.0),
            top_ten,
        ],
        trials: vec![Trial {
            location: "Fairgrounds".to_string(),
            notes: String::new(),
            clubs: vec![Club {
                name: "Hounds".to_string(),
                venue: "AKC".to_string(),
            }],
            runs: vec![standard, jumpers, pairs, faulted, preferred],
        }],
    }
}

pub(super) fn build_with(
    config: &Configuration,
    state: &VisibilityFilterState,
    options: ReportOptions,
    dog: &Dog,
) -> PointsReport {
    PointsReportBuilder::new(config, state.filter(), ScoringOptions::default(), options)
        .build(dog, date(10, 18))
}

pub(super) fn build(dog: &Dog) -> PointsReport {
    let config = configuration();
    let state = VisibilityFilterState::default();
    build_with(&config, &state, ReportOptions::default(), dog)
}

use crate::aggregate::fold::{BatchFold, ordered_pair, weapon_key};
use crate::record::parse_line;

fn event(line: &str) -> crate::record::KillEvent {
    parse_line(line, ';').unwrap()
}

#[test]
fn numeric_ids_are_ordered_numerically() {
    // Assert
    assert_eq!(ordered_pair("900", "1000"), ("900", "1000"));
    assert_eq!(ordered_pair("1000", "900"), ("900", "1000"));
    assert_eq!(ordered_pair("bravo", "alpha"), ("alpha", "bravo"));
}

#[test]
fn numerically_equal_ids_order_the_same_both_ways() {
    // Act
    let forward = ordered_pair("7", "007");
    let backward = ordered_pair("007", "7");

    // Assert
    assert_eq!(forward, backward);
    assert_eq!(forward, ("007", "7"));
    assert_eq!(
        crate::aggregate::rivalry_key("7020", "7", "007"),
        crate::aggregate::rivalry_key("7020", "007", "7")
    );
}

#[test]
fn weapon_keys_are_safe_field_names() {
    // Assert
    assert_eq!(weapon_key("7.62x39 AK"), "7_62x39 AK");
    assert_eq!(weapon_key("  "), "unknown");
    assert_eq!(weapon_key("M4"), "M4");
}

#[test]
fn batch_collapses_repeated_players() {
    // Arrange
    let events = vec![
        event("2025.05.09-11.00.00;Alpha;1;Bravo;2;M4;50;PC;PC"),
        event("2025.05.09-11.05.00;Bravo;2;Alpha;1;AK;75;PC;PC"),
        event("2025.05.09-11.10.00;Alpha2;1;Bravo;2;M4;20;PC;PC"),
    ];

    // Act
    let fold = BatchFold::from_events(&events);

    // Assert
    assert_eq!(fold.players.len(), 2);
    assert_eq!(fold.rivalries.len(), 1);

    let alpha = &fold.players["1"];
    assert_eq!(alpha.kills, 2);
    assert_eq!(alpha.deaths, 1);
    assert_eq!(alpha.name, "Alpha2");
    assert_eq!(alpha.aliases, vec!["Alpha".to_string(), "Alpha2".to_string()]);
    assert_eq!(alpha.weapons["M4"], 2);
    assert_eq!(alpha.longest_kill, 50.0);

    let rivalry = &fold.rivalries[&("1".to_string(), "2".to_string())];
    assert_eq!(rivalry.a_kills, 2);
    assert_eq!(rivalry.b_kills, 1);
    assert_eq!(rivalry.last_killer_id, "1");
    assert_eq!(rivalry.last_weapon, "M4");
}

#[test]
fn self_kill_counts_kill_death_and_suicide() {
    // Arrange
    let events = vec![event("2025.05.09-11.00.00;Alpha;1;Alpha;1;Falling;0;PC;PC")];

    // Act
    let fold = BatchFold::from_events(&events);

    // Assert
    let alpha = &fold.players["1"];
    assert_eq!((alpha.kills, alpha.deaths, alpha.suicides), (1, 1, 1));
    assert!(alpha.weapons.is_empty());
    assert!(fold.rivalries.is_empty());
}

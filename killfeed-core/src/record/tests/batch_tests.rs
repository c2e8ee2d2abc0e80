use crate::record::parse_batch;

#[test]
fn ten_lines_with_two_malformed_yield_eight_events() {
    // Arrange
    let mut lines = Vec::new();
    for i in 0..8 {
        lines.push(format!(
            "2025.05.09-11.58.{:02};Killer{i};{i}00;Victim{i};{i}01;M4;{i}.5;PC;PC",
            30 + i
        ));
    }
    lines.insert(3, "2025.05.09-11.58.37;Player1;12345".to_string());
    lines.insert(7, "yesterday;Player1;12345;Player2;67890;AK;1;PC;PC".to_string());
    let text = lines.join("\n");

    // Act
    let batch = parse_batch(&text, ';');

    // Assert
    assert_eq!(batch.events.len(), 8);
    assert_eq!(batch.skipped, 2);
    assert_eq!(batch.errors_by_kind.get("short-record"), Some(&1));
    assert_eq!(batch.errors_by_kind.get("bad-timestamp"), Some(&1));
    assert_eq!(batch.events[7].killer.name, "Killer7");
}

#[test]
fn blank_lines_are_not_counted() {
    // Arrange
    let text = "\n2025.05.09-11.58.37;A;1;B;2;AK;1;PC;PC\r\n\r\n   \n";

    // Act
    let batch = parse_batch(text, ';');

    // Assert
    assert_eq!(batch.events.len(), 1);
    assert_eq!(batch.skipped, 0);
    assert!(batch.errors_by_kind.is_empty());
}

#[test]
fn events_keep_file_order() {
    // Arrange
    let text = "2025.05.09-11.58.39;A;1;B;2;AK;1;PC;PC\n2025.05.09-11.58.37;B;2;A;1;AK;1;PC;PC\n";

    // Act
    let batch = parse_batch(text, ';');

    // Assert
    assert_eq!(batch.events[0].killer.id, "1");
    assert_eq!(batch.events[1].killer.id, "2");
}

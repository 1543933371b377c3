use speech_atlas::models::{decode_sentiment, decode_word_counts, Metric};

#[test]
fn parse_sentiment_sample() {
    let sample = r#"
    {
      "USA": 0.7421,
      "FRA": 0.7113,
      "GBR": 0.6987,
      "YEM": null
    }
    "#;

    let map = decode_sentiment(sample).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map["USA"], 0.7421);
    assert_eq!(map["FRA"], 0.7113);
    assert!(!map.contains_key("YEM"));
}

#[test]
fn parse_word_count_sample() {
    let sample = r#"
    [
      {"country_code": "USA", "word_count": 5000},
      {"country_code": "FRA", "word_count": 3210},
      {"country_code": "IND", "word_count": 8754.0}
    ]
    "#;

    let map = decode_word_counts(sample).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map["USA"], 5000.0);
    assert_eq!(map["IND"], 8754.0);
}

#[test]
fn metric_dispatch_uses_the_right_shape() {
    let object = r#"{"USA": 0.7}"#;
    let array = r#"[{"country_code": "USA", "word_count": 12}]"#;

    assert!(Metric::Sentiment.decode(object).is_ok());
    assert!(Metric::WordCount.decode(array).is_ok());
    assert!(Metric::Sentiment.decode(array).is_err());
    assert!(Metric::WordCount.decode(object).is_err());
}

#[test]
fn scales_match_their_metric_example() {
    // Geometry [USA, FRA], metrics {USA: 5000}, domain [0, 10000]:
    // USA fills with scale(5000), FRA falls back to grey.
    let scale = Metric::WordCount.scale();
    let map = decode_word_counts(r#"[{"country_code": "USA", "word_count": 5000}]"#).unwrap();

    let usa = scale.color(map["USA"]);
    assert_ne!(usa, speech_atlas::scale::FALLBACK);
    assert!(map.get("FRA").is_none());
}

use criterion::{Criterion, criterion_group, criterion_main};
use flashmind::llm::parse_deck;
use std::hint::black_box;

fn sample_reply(cards: usize) -> String {
    let records = (1..=cards)
        .map(|id| match id % 3 {
            0 => format!(
                r#"{{"id": {id}, "type": "basic", "question": "Explain concept {id}", "correctAnswer": "Concept {id} in short", "userExplanation": "Because of reason {id}."}}"#
            ),
            1 => format!(
                r#"{{"id": {id}, "type": "true_false", "question": "Statement {id} holds", "correctAnswer": "True"}}"#
            ),
            _ => format!(
                r#"{{"id": {id}, "type": "multiple_choice", "question": "Pick answer {id}", "options": ["A{id}", "B{id}", "C{id}", "D{id}"], "correctAnswer": "C{id}"}}"#
            ),
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("```json\n[\n{records}\n]\n```")
}

fn bench_parse_deck(c: &mut Criterion) {
    let reply = sample_reply(20);

    c.bench_function("parse_deck", |b| {
        b.iter(|| {
            let deck = parse_deck(black_box(&reply)).expect("sample reply should parse");
            black_box(deck);
        });
    });
}

criterion_group!(benches, bench_parse_deck);
criterion_main!(benches);

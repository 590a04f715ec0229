//! Benchmarks for markup storage and typing.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use richnote::editor::SpanEditor;

fn styled_note() -> SpanEditor {
    let mut editor = SpanEditor::new();
    for i in 0..200 {
        let start = editor.len();
        editor.insert(start, &format!("• item number {i} with some text\n"));
        match i % 4 {
            0 => editor.toggle_bold(start + 2, start + 8),
            1 => editor.toggle_italic(start + 4, start + 16),
            2 => editor.toggle_underline(start, start + 10),
            _ => editor.toggle_strikethrough(start + 6, start + 12),
        }
    }
    editor
}

fn bench_write_markup(c: &mut Criterion) {
    let editor = styled_note();
    c.bench_function("write_markup", |b| b.iter(|| black_box(&editor).to_markup()));
}

fn bench_read_markup(c: &mut Criterion) {
    let markup = styled_note().to_markup();
    c.bench_function("read_markup", |b| {
        b.iter(|| SpanEditor::from_markup(black_box(&markup)))
    });
}

fn bench_typing(c: &mut Criterion) {
    let editor = styled_note();
    c.bench_function("typing_mid_note", |b| {
        b.iter(|| {
            let mut editor = editor.clone();
            for offset in (0..500).step_by(25) {
                editor.insert(offset, "x");
            }
            editor
        })
    });
}

criterion_group!(benches, bench_write_markup, bench_read_markup, bench_typing);
criterion_main!(benches);

//! This bench test maps every verse of the English Psalms, where most
//! chapters are renumbered, to the Original and Septuagint versifications.

#![allow(missing_docs)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use scripture::{Registry, VerseRef, VersificationType};

const PSALMS: i32 = 19;

fn psalms(registry: &Registry) -> Vec<VerseRef> {
    let english = registry.get(VersificationType::English).unwrap();
    (1..=english.last_chapter(PSALMS))
        .flat_map(|chapter| {
            (1..=english.last_verse(PSALMS, chapter)).map(move |verse| (chapter, verse))
        })
        .map(|(chapter, verse)| VerseRef::new(PSALMS, chapter, verse, &english).unwrap())
        .collect()
}

fn change_versification(c: &mut Criterion) {
    let registry = Registry::global();
    let verses = psalms(registry);

    for target in [VersificationType::Original, VersificationType::Septuagint] {
        let target = registry.get(target).unwrap();
        c.bench_function(&format!("english psalms to {}", target.name()), |b| {
            b.iter_batched(
                || verses.clone(),
                |mut verses| {
                    for verse in &mut verses {
                        verse.change_versification(&target);
                    }
                    verses
                },
                BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(benches, change_versification);
criterion_main!(benches);

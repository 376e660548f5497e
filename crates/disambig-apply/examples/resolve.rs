use std::env;

use anyhow::{Context, Result, bail};

use disambig_apply::{
    CategoryDisambiguator, Disambiguator, DisambiguatorGroup, ReviewDisambiguator,
    StraightDisambiguator,
};
use disambig_types::{DEFAULT_LEMMA_KEY, DEFAULT_REVIEW_TOKEN, Record};

const USAGE: &str =
    "usage: cargo run -p disambig-apply --example resolve -- <prefix> <category-key> <lemma> [<tag>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let prefix = args.next().context(USAGE)?;
    let category_key = args.next().context(USAGE)?;
    let lemma = args.next().context(USAGE)?;
    let tag = args.next();
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let straight =
        StraightDisambiguator::from_file(format!("{prefix}straight.json"), DEFAULT_LEMMA_KEY)?;
    let tagged = CategoryDisambiguator::from_file(
        format!("{prefix}{category_key}.json"),
        &category_key,
        DEFAULT_LEMMA_KEY,
    )?;
    let review = ReviewDisambiguator::from_file(
        format!("{prefix}needs.json"),
        DEFAULT_REVIEW_TOKEN,
        DEFAULT_LEMMA_KEY,
    )?;
    let group = DisambiguatorGroup::new(
        vec![Box::new(straight), Box::new(tagged), Box::new(review)],
        DEFAULT_LEMMA_KEY,
    );

    let mut record = Record::new();
    record.insert(DEFAULT_LEMMA_KEY, &lemma);
    if let Some(tag) = &tag {
        record.insert(&category_key, tag);
    }

    match group.resolve(&record) {
        Some(token) => println!("{lemma}: {token}"),
        None => println!("{lemma}: no opinion"),
    }
    Ok(())
}

mod common;

use common::fixtures::*;
use common::{TestResult, init_logger};
use quire::{OutputFormat, PipelineBuilder};

/// A document whose first page cites its last one. Every document uses the
/// same identifiers.
fn numbered_document(index: usize, pages: usize) -> String {
    let mut flow = block(&format!("Document {} ends on page {}", index, citation("end")));
    for page in 2..pages {
        flow.push_str(&page_break_block(&format!("p{}", page), &format!("Page {}", page)));
    }
    flow.push_str(&page_break_block("end", &format!("Last page of {}", index)));
    document(&flow)
}

#[test]
fn batch_results_keep_input_order() -> TestResult {
    init_logger();
    let sources: Vec<String> = (0..8).map(|i| numbered_document(i, 2 + i % 3)).collect();
    let pipeline = PipelineBuilder::new().with_format(OutputFormat::Pdf).build()?;

    let results = pipeline.render_many(&sources);

    assert_eq!(results.len(), sources.len());
    for (i, result) in results.into_iter().enumerate() {
        let (bytes, stats) = result?;
        assert_eq!(stats.pages, 2 + i % 3, "document {}", i);
        let doc = lopdf::Document::load_mem(&bytes)?;
        let first = common::pdf_assertions::shown_strings(&doc, 1).join(" ");
        assert!(first.contains(&format!("Document {}", i)), "got {:?}", first);
        assert!(first.contains(&(2 + i % 3).to_string()));
    }
    Ok(())
}

#[test]
fn registries_are_not_shared_between_documents() -> TestResult {
    init_logger();
    // Same ids everywhere; a shared registry would report conflicts.
    let sources = vec![numbered_document(0, 3); 6];
    let pipeline = PipelineBuilder::new().with_format(OutputFormat::Afp).build()?;

    let results = pipeline.render_many(&sources);

    assert!(results.iter().all(|r| r.is_ok()));
    let outputs: Vec<Vec<u8>> = results.into_iter().map(|r| r.map(|(b, _)| b)).collect::<Result<_, _>>()?;
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}

#[test]
fn one_failing_document_does_not_stop_the_batch() -> TestResult {
    init_logger();
    let sources = vec![
        numbered_document(0, 2),
        "<fo:root/>".to_string(),
        numbered_document(2, 2),
    ];
    let pipeline = PipelineBuilder::new().build()?;

    let results = pipeline.render_many(&sources);

    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(quire::PipelineError::Tree(_))));
    assert!(results[2].is_ok());
    Ok(())
}

#[test]
fn a_pipeline_can_be_shared_across_threads() -> TestResult {
    init_logger();
    let pipeline = PipelineBuilder::new().with_format(OutputFormat::Afp).build()?;
    let source = numbered_document(7, 4);

    let pages: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    pipeline
                        .render_str(&source, Vec::new())
                        .map(|(_, stats)| stats.pages)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("render thread panicked"))
            .collect::<Result<_, _>>()
    })?;

    assert_eq!(pages, [4, 4, 4, 4]);
    Ok(())
}

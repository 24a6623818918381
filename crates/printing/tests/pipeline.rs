use std::fs;
use std::sync::{Arc, Mutex};

use textpad_printing::{
    export_single_page, layout_single_page, print_text, PageSetup, PrintError, PrintSpooler,
    SpoolRequest,
};

#[derive(Clone, Default)]
struct RecordingSpooler {
    jobs: Arc<Mutex<Vec<RecordedJob>>>,
}

#[derive(Clone)]
struct RecordedJob {
    name: String,
    pages: u32,
    pdf: Vec<u8>,
}

impl PrintSpooler for RecordingSpooler {
    fn spool(&self, request: &SpoolRequest<'_>) -> Result<(), PrintError> {
        let pdf = fs::read(request.document)?;
        self.jobs
            .lock()
            .expect("recording lock poisoned")
            .push(RecordedJob {
                name: request.job_name.to_string(),
                pages: request.pages,
                pdf,
            });
        Ok(())
    }
}

fn compact_setup() -> PageSetup {
    PageSetup {
        title: "pipeline.txt".into(),
        top_pt: 100.0,
        line_step_pt: 20.0,
        bottom_margin_pt: 40.0,
        ..PageSetup::default()
    }
}

#[test]
fn export_places_every_line_on_one_page() {
    let setup = compact_setup();
    let text = (1..=10).map(|n| format!("row {n}")).collect::<Vec<_>>().join("\n");

    let page = layout_single_page(&text, &setup);
    assert_eq!(page.lines.len(), 10);
    assert_eq!(page.lines[0].y_pt, 100.0);
    assert_eq!(page.lines[9].y_pt, 100.0 - 9.0 * 20.0);

    let bytes = export_single_page(&text, &setup).expect("export");
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn printing_paginates_with_the_same_geometry() {
    let setup = compact_setup();
    assert_eq!(setup.lines_per_page(), 4);
    let text = (1..=10).map(|n| format!("row {n}")).collect::<Vec<_>>().join("\n");

    let spooler = RecordingSpooler::default();
    let summary = print_text(&text, &setup, &spooler).expect("print");
    assert_eq!(summary.pages, 3);

    let jobs = spooler.jobs.lock().expect("recording lock poisoned");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "pipeline.txt");
    assert_eq!(jobs[0].pages, 3);
    assert!(jobs[0].pdf.starts_with(b"%PDF-"));
}

//! OCR and translation worker thread

use crate::ocr;
use crate::translate::{Translator, DEFAULT_TARGET_LANG};
use crossbeam_channel::{unbounded, Receiver, Sender};
use image::RgbaImage;
use overlay::assist::{
    sample_line_colors, AssistError, AssistKind, AssistOutput, RecognizedLine, TextAssist,
    TranslatedLine,
};
use overlay::controller::AssistRequest;
use std::thread::{self, JoinHandle};

/// Source language preferred when recognizing text for translation
const TRANSLATE_OCR_LANG: &str = "en-US";

/// Windows OCR plus HTTP translation
pub struct SystemAssist {
    translator: Option<Translator>,
}

impl SystemAssist {
    pub fn new() -> Self {
        let translator = match Translator::new(DEFAULT_TARGET_LANG) {
            Ok(t) => Some(t),
            Err(e) => {
                log::warn!("Translation disabled: {}", e);
                None
            }
        };
        Self { translator }
    }
}

impl TextAssist for SystemAssist {
    fn recognize(&self, image: &RgbaImage) -> Result<Vec<RecognizedLine>, AssistError> {
        ocr::recognize_lines(image, None)
    }

    fn translate(&self, image: &RgbaImage) -> Result<Vec<TranslatedLine>, AssistError> {
        let translator = self.translator.as_ref().ok_or(AssistError::Unavailable)?;
        let lines = ocr::recognize_lines(image, Some(TRANSLATE_OCR_LANG))?;
        if lines.is_empty() {
            return Err(AssistError::NoText);
        }

        lines
            .into_iter()
            .map(|line| {
                let text = translator.translate(&line.text)?;
                let (background, text_color) = sample_line_colors(image, &line.bounds);
                Ok(TranslatedLine { text, bounds: line.bounds, background, text_color })
            })
            .collect()
    }
}

struct Job {
    kind: AssistKind,
    generation: u64,
    image: RgbaImage,
}

/// Result tagged with the generation of the request that produced it
#[derive(Debug)]
pub struct AssistReply {
    pub generation: u64,
    pub result: Result<AssistOutput, AssistError>,
}

/// Runs requests one at a time off the UI thread.
///
/// Dropping the worker closes the job channel, which ends the thread once
/// the request in flight completes.
pub struct AssistWorker {
    job_tx: Sender<Job>,
    reply_rx: Receiver<AssistReply>,
    _handle: Option<JoinHandle<()>>,
}

impl AssistWorker {
    pub fn spawn<A, F>(make_assist: F) -> Self
    where
        A: TextAssist + 'static,
        F: FnOnce() -> A + Send + 'static,
    {
        let (job_tx, job_rx) = unbounded::<Job>();
        let (reply_tx, reply_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("assist-worker".into())
            .spawn(move || {
                let _apartment = WinRtApartment::enter();
                let assist = make_assist();
                worker_loop(&assist, job_rx, reply_tx);
            })
            .map_err(|e| log::error!("Failed to start assist worker: {}", e))
            .ok();

        Self { job_tx, reply_rx, _handle: handle }
    }

    pub fn submit(&self, request: AssistRequest) -> bool {
        let job = Job {
            kind: request.kind,
            generation: request.generation,
            image: request.image.into_image(),
        };
        self.job_tx.send(job).is_ok()
    }

    /// Next finished reply, if any
    pub fn try_recv(&self) -> Option<AssistReply> {
        self.reply_rx.try_recv().ok()
    }
}

fn worker_loop(assist: &dyn TextAssist, jobs: Receiver<Job>, replies: Sender<AssistReply>) {
    for job in jobs {
        log::info!("Assist #{} {:?} started", job.generation, job.kind);
        let result = assist.run(job.kind, &job.image);
        if let Err(e) = &result {
            log::warn!("Assist #{} failed: {}", job.generation, e);
        }
        if replies.send(AssistReply { generation: job.generation, result }).is_err() {
            break;
        }
    }
    log::debug!("Assist worker stopped");
}

/// Multithreaded WinRT apartment for the worker thread
struct WinRtApartment {
    #[cfg(windows)]
    initialized: bool,
}

impl WinRtApartment {
    #[cfg(windows)]
    fn enter() -> Self {
        use windows::Win32::System::WinRT::{RoInitialize, RO_INIT_MULTITHREADED};
        let initialized = match unsafe { RoInitialize(RO_INIT_MULTITHREADED) } {
            Ok(()) => true,
            Err(e) => {
                log::warn!("WinRT init failed: {}", e);
                false
            }
        };
        Self { initialized }
    }

    #[cfg(not(windows))]
    fn enter() -> Self {
        Self {}
    }
}

#[cfg(windows)]
impl Drop for WinRtApartment {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { windows::Win32::System::WinRT::RoUninitialize() };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::Rect;
    use overlay::assist::AssistOutput;
    use overlay::pipeline::ExportImage;
    use std::time::Duration;

    struct EchoAssist;

    impl TextAssist for EchoAssist {
        fn recognize(&self, image: &RgbaImage) -> Result<Vec<RecognizedLine>, AssistError> {
            Ok(vec![RecognizedLine {
                text: format!("{}x{}", image.width(), image.height()),
                bounds: Rect::new(0, 0, image.width(), image.height()),
            }])
        }

        fn translate(&self, _image: &RgbaImage) -> Result<Vec<TranslatedLine>, AssistError> {
            Err(AssistError::Network("offline".into()))
        }
    }

    fn request(kind: AssistKind, generation: u64) -> AssistRequest {
        AssistRequest {
            kind,
            generation,
            image: ExportImage::from(RgbaImage::new(7, 3)),
        }
    }

    fn wait_reply(worker: &AssistWorker) -> AssistReply {
        for _ in 0..500 {
            if let Some(reply) = worker.try_recv() {
                return reply;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("worker did not reply");
    }

    #[test]
    fn replies_carry_their_generation() {
        let worker = AssistWorker::spawn(|| EchoAssist);
        assert!(worker.submit(request(AssistKind::Recognize, 4)));
        assert!(worker.submit(request(AssistKind::Translate, 5)));

        let first = wait_reply(&worker);
        assert_eq!(first.generation, 4);
        match first.result {
            Ok(AssistOutput::Recognized(lines)) => assert_eq!(lines[0].text, "7x3"),
            other => panic!("unexpected {:?}", other),
        }

        let second = wait_reply(&worker);
        assert_eq!(second.generation, 5);
        assert_eq!(second.result, Err(AssistError::Network("offline".into())));
    }

    #[test]
    fn empty_queue_has_no_reply() {
        let worker = AssistWorker::spawn(|| EchoAssist);
        assert!(worker.try_recv().is_none());
    }
}

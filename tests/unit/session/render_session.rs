use super::*;
use crate::assets::font::FontLibrary;
use crate::assets::provider::MemoryAssets;
use crate::encode::sink::InMemorySink;
use crate::scene::def::SceneDef;

const ANIMATED: &str = r##"{
    "canvas": {"width": 48, "height": 32},
    "fps": {"num": 10},
    "duration_secs": 1.2,
    "audio": "track.mp3",
    "layers": [
        {"kind": "background", "from": "#203040", "to": "#a0b0c0"},
        {"kind": "text", "text": "HI", "x": 24, "y": 4, "size_px": 8, "outline_px": 1,
         "schedule": {"start": 0.1, "duration": 0.4, "mode": {"type": "reveal"}}},
        {"kind": "shape", "shape": {"type": "ellipse", "cx": 24, "cy": 22, "rx": 6, "ry": 4},
         "fill": "#ff8800",
         "schedule": {"start": 0.3, "duration": 0.5, "ease": "out_back", "mode": {"type": "scale_in"}}}
    ]
}"##;

fn scene() -> Scene {
    let def = SceneDef::from_json_str(ANIMATED).unwrap();
    Scene::build(&def, &MemoryAssets::new(), &FontLibrary::builtin()).unwrap()
}

fn range(start: u64, end: u64) -> FrameRange {
    FrameRange::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

struct FailingSink {
    fail_at: u64,
    pushed: u64,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> PromoResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &Frame) -> PromoResult<()> {
        if idx.0 == self.fail_at {
            return Err(PromoError::render("sink full"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> PromoResult<()> {
        Ok(())
    }
}

#[test]
fn render_all_streams_every_frame_in_order() {
    let mut session = RenderSession::new(scene(), RenderSessionOpts::default()).unwrap();
    assert_eq!(session.total_frames(), 12);

    let mut sink = InMemorySink::new();
    let stats = session.render_all(&mut sink).unwrap();
    assert_eq!(
        stats,
        RenderStats {
            frames_total: 12,
            frames_rendered: 12
        }
    );

    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..12).collect::<Vec<_>>());

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (48, 32));
    assert_eq!(cfg.fps.num, 10);
    assert_eq!(cfg.audio.as_deref(), Some(std::path::Path::new("track.mp3")));
}

#[test]
fn parallel_matches_sequential() {
    let mut seq = RenderSession::new(scene(), RenderSessionOpts::default()).unwrap();
    let mut par = RenderSession::new(
        scene(),
        RenderSessionOpts {
            parallel: true,
            chunk_size: 5,
            threads: Some(3),
            channel_capacity: 2,
        },
    )
    .unwrap();

    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    seq.render_range(range(2, 11), &mut a).unwrap();
    let stats = par.render_range(range(2, 11), &mut b).unwrap();
    assert_eq!(stats.frames_rendered, 9);
    assert_eq!(a.frames(), b.frames());
    assert_eq!(b.frames()[0].0, FrameIndex(2));
}

#[test]
fn render_frame_matches_range_output() {
    let mut session = RenderSession::new(scene(), RenderSessionOpts::default()).unwrap();
    let mut sink = InMemorySink::new();
    session.render_range(range(4, 6), &mut sink).unwrap();
    let single = session.render_frame(FrameIndex(5)).unwrap();
    assert_eq!(sink.frames()[1].1, single);
}

#[test]
fn rejects_bad_ranges_and_options() {
    assert!(
        RenderSession::new(
            scene(),
            RenderSessionOpts {
                threads: Some(0),
                ..RenderSessionOpts::default()
            }
        )
        .is_err()
    );

    let mut session = RenderSession::new(scene(), RenderSessionOpts::default()).unwrap();
    let mut sink = InMemorySink::new();
    assert!(session.render_range(range(3, 3), &mut sink).is_err());
    assert!(session.render_range(range(0, 13), &mut sink).is_err());
    assert!(session.render_frame(FrameIndex(12)).is_err());
    assert!(sink.frames().is_empty());
}

#[test]
fn sink_errors_surface() {
    for parallel in [false, true] {
        let mut session = RenderSession::new(
            scene(),
            RenderSessionOpts {
                parallel,
                chunk_size: 4,
                ..RenderSessionOpts::default()
            },
        )
        .unwrap();
        let mut sink = FailingSink {
            fail_at: 3,
            pushed: 0,
        };
        let err = session.render_all(&mut sink).unwrap_err();
        assert!(err.to_string().contains("sink full"), "{err}");
        assert_eq!(sink.pushed, 3);
    }
}

#[test]
fn zero_chunk_size_is_normalized() {
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(7), 7);
    let mut session = RenderSession::new(
        scene(),
        RenderSessionOpts {
            parallel: true,
            chunk_size: 0,
            threads: Some(2),
            ..RenderSessionOpts::default()
        },
    )
    .unwrap();
    let mut sink = InMemorySink::new();
    assert_eq!(session.render_all(&mut sink).unwrap().frames_rendered, 12);
}

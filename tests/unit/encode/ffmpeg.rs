use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_straight_over_black() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0, 0, 0, 0], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn container_names() {
    assert_eq!(VideoContainer::default(), VideoContainer::WebM);
    assert_eq!("MP4".parse::<VideoContainer>().unwrap(), VideoContainer::Mp4);
    assert_eq!("vp9".parse::<VideoContainer>().unwrap(), VideoContainer::WebM);
    assert!("avi".parse::<VideoContainer>().is_err());
    assert_eq!(VideoContainer::Mp4.extension(), "mp4");
}

#[test]
fn command_carries_bitrate_and_codec() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("out/x.webm", VideoContainer::WebM));
    let cmd = sink.command(&SinkConfig {
        width: 64,
        height: 32,
        fps: 20,
    });
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let pos = |s: &str| args.iter().position(|a| a == s).unwrap();
    assert_eq!(args[pos("-s") + 1], "64x32");
    assert_eq!(args[pos("-r") + 1], "20");
    assert_eq!(args[pos("-c:v") + 1], "libvpx-vp9");
    assert_eq!(args[pos("-b:v") + 1], "8000000");
    assert_eq!(args.last().unwrap(), "out/x.webm");
}

#[test]
fn begin_rejects_odd_sizes_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("out.mp4", VideoContainer::Mp4));
    let err = sink
        .begin(SinkConfig {
            width: 11,
            height: 10,
            fps: 20,
        })
        .unwrap_err();
    assert!(matches!(err, PlaybackError::Encode(_)));
    assert!(sink.push_frame(FrameIndex(0), &FrameRGBA {
        width: 11,
        height: 10,
        data: vec![0; 440],
        premultiplied: true,
    })
    .is_err());
}

#[test]
fn zero_bitrate_is_rejected() {
    let mut opts = FfmpegSinkOpts::new("out.webm", VideoContainer::WebM);
    opts.bitrate_bps = 0;
    assert!(opts.validate().is_err());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a/b/out.webm");
    ensure_parent_dir(&target).unwrap();
    assert!(dir.path().join("a/b").is_dir());
    ensure_parent_dir(Path::new("bare.webm")).unwrap();
}

#[test]
fn writes_a_playable_file_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clip.webm");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out, VideoContainer::WebM));
    sink.begin(SinkConfig {
        width: 16,
        height: 16,
        fps: 20,
    })
    .unwrap();
    for i in 0..4u8 {
        let frame = FrameRGBA {
            width: 16,
            height: 16,
            data: [i * 60, 10, 200, 255].repeat(256),
            premultiplied: false,
        };
        sink.push_frame(FrameIndex(u64::from(i)), &frame).unwrap();
    }
    sink.end().unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

use std::time::Instant;

use pcd_core::ClipError;
use pcd_exporter::writer::{las::LasPointSink, PointWriter};
use pcd_parser::{parsers::load_polygon_set, reader::las::LasPointReader};

use crate::{
    builder::ClipConfig,
    progress::ProgressReporter,
    runner::{ClipPipeline, ClipSummary},
};

/// Clips `config.input` into `config.output`.
///
/// The output is created with the input's header. If the run fails after the
/// output was created, the partial file is removed.
pub fn clip_file<P: ProgressReporter>(
    config: &ClipConfig,
    progress: P,
) -> Result<ClipSummary, ClipError> {
    let start = Instant::now();
    let mut pipeline = ClipPipeline::new(config.chunk_size, config.mode, progress)?;

    let polygons = load_polygon_set(&config.polygons)?;
    let reader = LasPointReader::from_path(&config.input)?;
    log::info!(
        "input {:?}: {} points declared",
        config.input,
        reader.header().number_of_points()
    );
    let sink = LasPointSink::create(&config.output, reader.header())?;
    let mut writer = PointWriter::new(sink);

    log::info!("{} (chunks of {})", config.mode, config.chunk_size);
    match pipeline.run(&polygons, reader, &mut writer) {
        Ok(summary) => {
            log::info!(
                "kept {}/{} points in {} chunks, wrote {:?} in {:?}",
                summary.points_kept,
                summary.points_read,
                summary.chunks,
                config.output,
                start.elapsed()
            );
            Ok(summary)
        }
        Err(e) => {
            let sink = writer.into_sink();
            let path = sink.path().to_path_buf();
            match sink.discard() {
                Ok(()) => log::info!("removed partial output {:?}", path),
                Err(rm) => log::warn!("failed to remove partial output {:?}: {}", path, rm),
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs::OpenOptions,
        path::{Path, PathBuf},
    };

    use las::{point::Format, Builder, Header, Point, Reader, Writer};
    use tempfile::TempDir;

    use super::*;
    use crate::{builder::ClipConfigBuilder, progress::NoProgress};

    const UNIT_SQUARE: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
         "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}}
    ]}"#;

    const COVER_ALL: &str = r#"{"type": "Polygon",
        "coordinates": [[[-1000,-1000],[1000,-1000],[1000,1000],[-1000,1000],[-1000,-1000]]]}"#;

    fn header() -> Header {
        let mut builder = Builder::from((1, 2));
        builder.point_format = Format::new(3).unwrap();
        builder.system_identifier = "lasman test".to_string();
        builder.into_header().unwrap()
    }

    fn point(i: usize, x: f64, y: f64) -> Point {
        Point {
            x,
            y,
            z: 10.0 + i as f64,
            intensity: i as u16,
            return_number: 1,
            number_of_returns: 2,
            user_data: (i % 256) as u8,
            point_source_id: 7,
            gps_time: Some(1000.0 + i as f64),
            color: Some(las::Color::new(i as u16, 2, 3)),
            ..Default::default()
        }
    }

    fn write_input(path: &Path, coords: &[(f64, f64)]) {
        let mut writer = Writer::from_path(path, header()).unwrap();
        for (i, &(x, y)) in coords.iter().enumerate() {
            writer.write_point(point(i, x, y)).unwrap();
        }
        writer.close().unwrap();
    }

    fn read_points(path: &Path) -> Vec<Point> {
        Reader::from_path(path)
            .unwrap()
            .points()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn point_bytes(path: &Path) -> Vec<u8> {
        let raw = Reader::from_path(path)
            .unwrap()
            .header()
            .clone()
            .into_raw()
            .unwrap();
        let bytes = std::fs::read(path).unwrap();
        let start = raw.offset_to_point_data as usize;
        let len = raw.number_of_point_records as usize * raw.point_data_record_length as usize;
        bytes[start..start + len].to_vec()
    }

    struct Fixture {
        dir: TempDir,
        input: PathBuf,
        polygons: PathBuf,
    }

    impl Fixture {
        fn new(coords: &[(f64, f64)], polygons: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("input.las");
            write_input(&input, coords);
            let polygons_path = dir.path().join("polygons.geojson");
            std::fs::write(&polygons_path, polygons).unwrap();
            Self {
                dir,
                input,
                polygons: polygons_path,
            }
        }

        fn output(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn config(&self, output: &str) -> ClipConfigBuilder {
            ClipConfigBuilder::new(&self.input, self.output(output), &self.polygons)
        }
    }

    fn scenario() -> Fixture {
        Fixture::new(
            &[(0.0, 0.0), (1.0, 1.0), (5.0, 5.0), (-1.0, -1.0), (2.0, 2.0)],
            UNIT_SQUARE,
        )
    }

    fn grid() -> Vec<(f64, f64)> {
        (0..250)
            .map(|i| (f64::from(i % 25) * 0.25 - 1.0, f64::from(i / 25) * 0.5 - 1.0))
            .collect()
    }

    #[test]
    fn keeps_points_inside_the_polygon() {
        let fixture = scenario();
        let config = fixture.config("inside.las").chunk_size(2).build().unwrap();

        let summary = clip_file(&config, NoProgress).unwrap();
        assert_eq!(summary.points_read, 5);
        assert_eq!(summary.points_kept, 3);

        let kept = read_points(&config.output);
        let coords: Vec<(f64, f64)> = kept.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(Reader::from_path(&config.output).unwrap().header().number_of_points(), 3);
    }

    #[test]
    fn external_keeps_points_outside() {
        let fixture = scenario();
        let config = fixture
            .config("outside.las")
            .external(true)
            .build()
            .unwrap();

        clip_file(&config, NoProgress).unwrap();
        let coords: Vec<(f64, f64)> = read_points(&config.output)
            .iter()
            .map(|p| (p.x, p.y))
            .collect();
        assert_eq!(coords, vec![(5.0, 5.0), (-1.0, -1.0)]);
    }

    #[test]
    fn covering_polygon_reproduces_the_input() {
        let fixture = Fixture::new(&grid(), COVER_ALL);
        let config = fixture.config("copy.las").chunk_size(64).build().unwrap();

        let summary = clip_file(&config, NoProgress).unwrap();
        assert_eq!(summary.points_kept, 250);

        let input = Reader::from_path(&fixture.input).unwrap();
        let output = Reader::from_path(&config.output).unwrap();
        assert_eq!(output.header().number_of_points(), input.header().number_of_points());
        assert_eq!(output.header().point_format(), input.header().point_format());
        assert_eq!(output.header().transforms(), input.header().transforms());
        assert_eq!(output.header().version(), input.header().version());
        assert_eq!(
            output.header().system_identifier(),
            input.header().system_identifier()
        );

        assert_eq!(read_points(&config.output), read_points(&fixture.input));
        assert_eq!(point_bytes(&config.output), point_bytes(&fixture.input));
    }

    #[test]
    fn chunk_size_does_not_change_the_output() {
        let fixture = Fixture::new(&grid(), UNIT_SQUARE);

        let reference = fixture.config("large.las").chunk_size(100_000).build().unwrap();
        clip_file(&reference, NoProgress).unwrap();
        let single = fixture.config("single.las").chunk_size(1).build().unwrap();
        clip_file(&single, NoProgress).unwrap();

        let expected = read_points(&reference.output);
        assert!(!expected.is_empty());
        assert_eq!(read_points(&single.output), expected);
        assert_eq!(point_bytes(&single.output), point_bytes(&reference.output));
    }

    #[test]
    fn intersection_of_disjoint_polygons_is_empty() {
        let polygons = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[4,4],[6,4],[6,6],[4,6],[4,4]]]}}
        ]}"#;
        let fixture = Fixture::new(&[(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)], polygons);

        let union = fixture.config("union.las").build().unwrap();
        assert_eq!(clip_file(&union, NoProgress).unwrap().points_kept, 2);

        let both = fixture.config("both.las").intersection(true).build().unwrap();
        assert_eq!(clip_file(&both, NoProgress).unwrap().points_kept, 0);
        assert_eq!(Reader::from_path(&both.output).unwrap().header().number_of_points(), 0);

        let neither = fixture
            .config("neither.las")
            .intersection(true)
            .external(true)
            .build()
            .unwrap();
        assert_eq!(clip_file(&neither, NoProgress).unwrap().points_kept, 3);
    }

    #[test]
    fn writes_laz_output() {
        let fixture = scenario();
        let config = fixture.config("inside.laz").build().unwrap();

        clip_file(&config, NoProgress).unwrap();
        assert_eq!(read_points(&config.output).len(), 3);
    }

    #[test]
    fn truncated_input_removes_partial_output() {
        let fixture = Fixture::new(&grid(), COVER_ALL);
        let len = std::fs::metadata(&fixture.input).unwrap().len();
        let file = OpenOptions::new().write(true).open(&fixture.input).unwrap();
        file.set_len(len - 100).unwrap();
        drop(file);

        let config = fixture.config("partial.las").chunk_size(10).build().unwrap();
        let err = clip_file(&config, NoProgress).unwrap_err();
        assert!(matches!(err, ClipError::SourceRead { .. }));
        assert!(!config.output.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_device_is_a_sink_error_and_removes_output() {
        let coords: Vec<(f64, f64)> = (0..5000)
            .map(|i| (f64::from(i % 100), f64::from(i / 100)))
            .collect();
        let fixture = Fixture::new(&coords, COVER_ALL);
        let output = fixture.output("full.las");
        std::os::unix::fs::symlink("/dev/full", &output).unwrap();

        let config = fixture.config("full.las").chunk_size(1000).build().unwrap();
        let err = clip_file(&config, NoProgress).unwrap_err();
        assert!(matches!(err, ClipError::SinkWrite { .. }));
        assert!(std::fs::symlink_metadata(&output).is_err());
        assert_eq!(read_points(&fixture.input).len(), 5000);
    }

    #[test]
    fn missing_polygons_fail_before_output_is_created() {
        let fixture = scenario();
        let mut config = fixture.config("out.las").build().unwrap();
        config.polygons = fixture.output("absent.geojson");

        let err = clip_file(&config, NoProgress).unwrap_err();
        assert!(matches!(err, ClipError::SourceRead { .. }));
        assert!(!config.output.exists());
    }

    #[test]
    fn zero_chunk_size_fails_before_any_io() {
        let fixture = scenario();
        let mut config = fixture.config("out.las").build().unwrap();
        config.chunk_size = 0;
        config.polygons = fixture.output("absent.geojson");

        let err = clip_file(&config, NoProgress).unwrap_err();
        assert!(matches!(err, ClipError::Config(_)));
        assert!(!config.output.exists());
    }

    #[test]
    fn missing_input_is_a_source_error() {
        let fixture = scenario();
        let config = ClipConfigBuilder::new(
            fixture.output("absent.las"),
            fixture.output("out.las"),
            &fixture.polygons,
        )
        .build()
        .unwrap();

        let err = clip_file(&config, NoProgress).unwrap_err();
        assert!(matches!(err, ClipError::SourceRead { .. }));
        assert!(!config.output.exists());
    }
}

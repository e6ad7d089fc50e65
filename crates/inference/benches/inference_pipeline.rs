use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use image::RgbImage;
use inference::{
    ClassMappingTable,
    classes::ClassNames,
    normalize::normalize_detections,
    processing::{
        post::{PostProcessor, TransformParams},
        pre::{Letterbox, PreProcessor},
    },
};
use ndarray::{Array, IxDyn};

const NUM_ANCHORS: usize = 8400;
const NUM_CLASSES: usize = 80;

/// Mock YOLOv8 head output with `num_detections` confident anchors spread
/// across the input and the rest below any sensible threshold.
fn create_mock_yolo_output(num_detections: usize) -> Array<f32, IxDyn> {
    let mut output = Array::from_elem(IxDyn(&[1, 4 + NUM_CLASSES, NUM_ANCHORS]), 0.001f32);

    for i in 0..num_detections.min(NUM_ANCHORS) {
        let col = (i % 10) as f32;
        let row = (i / 10) as f32;
        output[[0, 0, i]] = 32.0 + col * 64.0;
        output[[0, 1, i]] = 32.0 + row * 64.0;
        output[[0, 2, i]] = 40.0;
        output[[0, 3, i]] = 40.0;
        output[[0, 4 + i % NUM_CLASSES, i]] = 0.9;
    }

    output
}

fn benchmark_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    let preprocessor = PreProcessor::default();

    let resolutions = [(640, 480), (1280, 720), (1920, 1080)];

    for (width, height) in resolutions.iter() {
        let image = RgbImage::from_pixel(*width, *height, image::Rgb([128, 128, 128]));

        group.bench_with_input(
            BenchmarkId::new("letterbox", format!("{}x{}", width, height)),
            &image,
            |b, image| b.iter(|| preprocessor.preprocess(black_box(image)).unwrap()),
        );
    }

    group.finish();
}

fn benchmark_postprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("postprocessing");
    let post_processor = PostProcessor::new(0.7, 300);
    let transform = TransformParams {
        orig_width: 1920,
        orig_height: 1080,
        letterbox: Letterbox {
            scale: 640.0 / 1920.0,
            offset_x: 0.0,
            offset_y: 140.0,
        },
    };

    for num_detections in [0, 5, 20, 50].iter() {
        let output = create_mock_yolo_output(*num_detections);

        group.bench_with_input(
            BenchmarkId::new("parse_detections", num_detections),
            &output,
            |b, output| {
                b.iter(|| {
                    post_processor
                        .parse_detections(black_box(&output.view()), black_box(0.25), &transform)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");
    let table = ClassMappingTable::standard();
    let names = ClassNames::coco();

    let transform = TransformParams {
        orig_width: 640,
        orig_height: 640,
        letterbox: Letterbox {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        },
    };
    let raw = PostProcessor::new(0.7, 300)
        .parse_detections(&create_mock_yolo_output(50).view(), 0.25, &transform)
        .unwrap();
    let detections = normalize_detections(raw, &names);

    group.bench_function("map_50_detections", |b| {
        b.iter(|| table.map(black_box(&detections), black_box(0.5)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_preprocessing,
    benchmark_postprocessing,
    benchmark_mapping
);
criterion_main!(benches);

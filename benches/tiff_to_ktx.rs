use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ktx_volume_rs::texture_pipeline::{
    Endianness, Filter, MetadataMap, MipLevels, PayloadCompression, Shape, TextureContainer,
    Volume, build_mip_chain, downsample_xy, encode_container, interleave_channels,
};

fn generate_mock_channel(depth: usize, height: usize, width: usize, seed: u16) -> Volume {
    let shape = Shape::new(depth, height, width);
    let data = (0..shape.voxel_count())
        .map(|i| ((i as u32).wrapping_mul(2654435761) >> 20) as u16 ^ seed)
        .collect();
    Volume::from_u16(shape, data).unwrap()
}

fn benchmark_pyramid_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pyramid_by_size");

    let sizes = vec![(16, 64, 64, "16x64x64"), (32, 128, 128, "32x128x128")];

    for (depth, height, width, label) in sizes {
        let channel = generate_mock_channel(depth, height, width, 0);
        group.bench_with_input(BenchmarkId::from_parameter(label), &channel, |b, channel| {
            b.iter(|| {
                build_mip_chain(black_box(channel.clone()), Filter::Maximum, MipLevels::Auto)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("xy_downsample_filters");
    let channel = generate_mock_channel(16, 256, 256, 0);

    let filters = vec![
        Filter::Minimum,
        Filter::Maximum,
        Filter::Mean,
        Filter::blended(),
    ];

    for filter in filters {
        group.bench_with_input(BenchmarkId::from_parameter(filter), &channel, |b, channel| {
            b.iter(|| downsample_xy(black_box(channel), filter).unwrap());
        });
    }

    group.finish();
}

fn benchmark_encode_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_compression");
    let channels = [
        generate_mock_channel(16, 64, 64, 0),
        generate_mock_channel(16, 64, 64, 0x5a5a),
    ];
    let combined = interleave_channels(&channels).unwrap();
    let chain = build_mip_chain(combined, Filter::Maximum, MipLevels::Auto).unwrap();
    let container = TextureContainer::assemble(chain, MetadataMap::new(), Vec::new()).unwrap();

    let compressions = vec![
        (PayloadCompression::None, "none"),
        (PayloadCompression::Deflate, "deflate"),
    ];

    for (compression, label) in compressions {
        group.bench_function(label, |b| {
            b.iter(|| {
                encode_container(black_box(&container), Endianness::Little, compression).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_pyramid_sizes,
    benchmark_filters,
    benchmark_encode_compression
);
criterion_main!(benches);

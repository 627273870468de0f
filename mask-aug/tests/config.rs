use mask_aug::{PipelineConfig, TransformConfig};
use noisy_float::prelude::*;
use tch::Device;
use tch_goodies::Ratio;

#[test]
fn parse_pipeline_with_defaults() {
    let text = r#"
    {
        stages: [
            { type: "ToTensor" },
            { type: "StackChannels" },
            { type: "HorizontalFlip", rate: 1.0 },
            { type: "GaussianBlur", kernel_sizes: [3, 9] },
            { type: "RandomResize" },
            { type: "AdjustContrast", range: [0.5, 1.5] },
            { type: "RandomAffine", angle: [-10, 10] },
            { type: "ToDevice", device: "cpu" },
            { type: "CorrectBoxes" },
        ],
    }
    "#;
    let config: PipelineConfig = json5::from_str(text).unwrap();

    assert_eq!(config.stages.len(), 9);
    assert_eq!(
        config.stages[3],
        TransformConfig::GaussianBlur {
            rate: Ratio::half(),
            kernel_sizes: vec![3, 9],
        }
    );
    assert_eq!(
        config.stages[4],
        TransformConfig::RandomResize {
            rate: Ratio::half(),
            min_size: 300,
            max_size: 1440,
        }
    );
    assert_eq!(
        config.stages[5],
        TransformConfig::AdjustContrast {
            rate: Ratio::half(),
            range: (r64(0.5), r64(1.5)),
        }
    );
    assert_eq!(
        config.stages[7],
        TransformConfig::ToDevice {
            device: Device::Cpu
        }
    );

    let pipeline = config.build().unwrap();
    assert_eq!(
        pipeline.stage_names(),
        vec![
            "ToTensor",
            "StackChannels",
            "HorizontalFlip",
            "GaussianBlur",
            "RandomResize",
            "AdjustContrast",
            "RandomAffine",
            "ToDevice",
            "CorrectBoxes",
        ]
    );
}

#[test]
fn out_of_range_rate_is_rejected_on_parse() {
    let text = r#"{ stages: [{ type: "VerticalFlip", rate: 1.5 }] }"#;
    assert!(json5::from_str::<PipelineConfig>(text).is_err());
}

#[test]
fn invalid_parameters_are_rejected_on_build() {
    let cases = [
        r#"{ stages: [{ type: "GaussianBlur", kernel_sizes: [] }] }"#,
        r#"{ stages: [{ type: "GaussianBlur", kernel_sizes: [3, 4] }] }"#,
        r#"{ stages: [{ type: "RandomResize", min_size: 500, max_size: 500 }] }"#,
        r#"{ stages: [{ type: "AdjustBrightness", range: [1.7, 0.3] }] }"#,
        r#"{ stages: [{ type: "RandomAffine", scale: [0.0, 1.0] }] }"#,
        r#"{ stages: [{ type: "Pipeline", stages: [{ type: "RandomResize", min_size: 9, max_size: 3 }] }] }"#,
    ];

    for text in cases {
        let config: PipelineConfig = json5::from_str(text).unwrap();
        assert!(config.build().is_err(), "accepted {}", text);
    }
}

#[test]
fn nested_pipeline_builds() {
    let text = r#"
    {
        stages: [
            { type: "ToTensor" },
            { type: "Pipeline", stages: [{ type: "VerticalFlip" }, { type: "CorrectBoxes" }] },
        ],
    }
    "#;
    let config: PipelineConfig = json5::from_str(text).unwrap();
    let pipeline = config.build().unwrap();
    assert_eq!(pipeline.stage_names(), vec!["ToTensor", "Pipeline"]);
}

#[test]
fn default_pipeline_roundtrip() {
    let config = PipelineConfig::default();
    let text = json5::to_string(&config).unwrap();
    let parsed: PipelineConfig = json5::from_str(&text).unwrap();
    assert_eq!(parsed, config);
    assert_eq!(parsed.build().unwrap().len(), 10);
}

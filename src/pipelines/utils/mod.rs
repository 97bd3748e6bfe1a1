use super::cache::ModelOptions;
use crate::error::{PipelineError, Result};
use candle_core::Device;

pub mod builder;
pub use builder::{BasePipelineBuilder, StandardPipelineBuilder};

/// Which device a pipeline should run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    /// CPU (default).
    #[default]
    Cpu,
    /// A specific CUDA GPU.
    Cuda(usize),
    /// The first CUDA GPU when one is available, otherwise CPU.
    Auto,
}

impl DeviceRequest {
    /// Creates the candle device.
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
            DeviceRequest::Auto => Device::cuda_if_available(0).map_err(|e| {
                PipelineError::Device(format!("Failed to probe for a CUDA device: {e}"))
            }),
        }
    }
}

impl std::str::FromStr for DeviceRequest {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(DeviceRequest::Cpu),
            "auto" => Ok(DeviceRequest::Auto),
            "cuda" | "gpu" => Ok(DeviceRequest::Cuda(0)),
            other => match other.strip_prefix("cuda:") {
                Some(index) => index.parse().map(DeviceRequest::Cuda).map_err(|_| {
                    PipelineError::Device(format!("Invalid CUDA device index in '{s}'"))
                }),
                None => Err(PipelineError::Device(format!(
                    "Unknown device '{s}'. Use: cpu, cuda, cuda:N, auto"
                ))),
            },
        }
    }
}

macro_rules! impl_device_methods {
    (delegated: $builder:ident < $($gen:ident : $bound:path),* >) => {
        impl<$($gen: $bound),*> $builder<$($gen),*> {
            /// Use CPU for inference (default).
            pub fn cpu(mut self) -> Self {
                *self.0.device_request_mut() = crate::pipelines::utils::DeviceRequest::Cpu;
                self
            }

            /// Use a specific CUDA GPU for inference.
            pub fn cuda(mut self, index: usize) -> Self {
                *self.0.device_request_mut() = crate::pipelines::utils::DeviceRequest::Cuda(index);
                self
            }

            /// Use the first CUDA GPU if present, otherwise the CPU.
            pub fn auto_device(mut self) -> Self {
                *self.0.device_request_mut() = crate::pipelines::utils::DeviceRequest::Auto;
                self
            }

            /// Use an already-parsed device request.
            pub fn device(mut self, request: crate::pipelines::utils::DeviceRequest) -> Self {
                *self.0.device_request_mut() = request;
                self
            }
        }
    };
}

pub(crate) use impl_device_methods;

pub fn build_cache_key<O: ModelOptions>(options: &O, device: &Device) -> String {
    format!("{}-{:?}", options.cache_key(), device.location())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_names() {
        assert_eq!("cpu".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cpu);
        assert_eq!("AUTO".parse::<DeviceRequest>().unwrap(), DeviceRequest::Auto);
        assert_eq!("cuda".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cuda(0));
        assert_eq!("cuda:2".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cuda(2));
    }

    #[test]
    fn rejects_unknown_devices() {
        assert!("tpu".parse::<DeviceRequest>().is_err());
        assert!("cuda:x".parse::<DeviceRequest>().is_err());
    }

    #[test]
    fn cpu_always_resolves() {
        assert!(DeviceRequest::Cpu.resolve().unwrap().is_cpu());
    }
}

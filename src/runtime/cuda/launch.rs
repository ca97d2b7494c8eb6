//! NVRTC compilation and launching of emitted kernels

use super::device::CudaDevice;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::kernel::{
    InplaceElemwise, InplaceOp, KernelArg, KernelEmitting, KernelLaunchDescriptor, LaunchDims,
    MAX_BLOCKS, MAX_THREADS_PER_BLOCK,
};
use crate::tensor::Layout;
use cudarc::driver::PushKernelArg;
use cudarc::driver::safe::{CudaFunction, LaunchConfig};
use cudarc::nvrtc::compile_ptx;
use std::sync::Arc;

/// Compiled function for `emitter`, compiling on a cache miss
pub(crate) fn function_for(
    device: &CudaDevice,
    emitter: &impl KernelEmitting,
) -> Result<Arc<CudaFunction>> {
    device
        .kernels()
        .get_or_try_insert(device.index(), emitter.kernel_key(), || {
            let desc = first_kernel(emitter)?;
            log::debug!("cuda:{}: compiling {}", device.index(), desc.entry_name);
            let ptx = compile_ptx(&desc.source)
                .map_err(|e| Error::kernel(&desc.entry_name, format!("nvrtc: {}", e)))?;
            let module = device.context().load_module(ptx)?;
            Ok(module.load_function(&desc.entry_name)?)
        })
}

/// The single kernel `emitter` produces
pub(crate) fn first_kernel(emitter: &impl KernelEmitting) -> Result<KernelLaunchDescriptor> {
    emitter
        .kernels()?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Internal(format!("{:?} emitted no kernel", emitter.kernel_key())))
}

/// Launch `func` with the geometry of `desc` on the device stream
///
/// # Safety
/// Every buffer argument must be a live device allocation covering the
/// elements the kernel addresses through the accompanying sizes and strides.
pub(crate) unsafe fn launch(
    device: &CudaDevice,
    func: &CudaFunction,
    desc: &KernelLaunchDescriptor,
    args: &[KernelArg],
) -> Result<()> {
    desc.check_args(args)?;

    let cfg = LaunchConfig {
        grid_dim: desc.grid_dims.as_tuple(),
        block_dim: desc.block_dims.as_tuple(),
        shared_mem_bytes: 0,
    };

    let mut builder = device.stream().launch_builder(func);
    for arg in args {
        match arg {
            KernelArg::Size(v) | KernelArg::Buffer(v) => builder.arg(v),
            KernelArg::SSize(v) => builder.arg(v),
        };
    }
    unsafe { builder.launch(cfg) }
        .map_err(|e| Error::kernel(&desc.entry_name, e.to_string()))?;
    Ok(())
}

/// Launch geometry covering `n` elements with a grid-stride loop
fn elementwise_dims(n: usize) -> (LaunchDims, LaunchDims) {
    let threads = n.clamp(1, MAX_THREADS_PER_BLOCK);
    let blocks = n.div_ceil(threads).clamp(1, MAX_BLOCKS);
    (LaunchDims::linear(blocks as u32), LaunchDims::linear(threads as u32))
}

/// `dst op= src` over `dst_layout`, with `src` already laid out to its shape
///
/// Offsets are in bytes; strides are in elements.
///
/// # Safety
/// Both pointers must be live device allocations of `dtype` elements that
/// cover every position the layouts address.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn launch_inplace(
    device: &CudaDevice,
    op: InplaceOp,
    dtype: DType,
    dst: u64,
    dst_off: u64,
    dst_layout: &Layout,
    src: u64,
    src_off: u64,
    src_strides: &[isize],
) -> Result<()> {
    let n = dst_layout.elem_count();
    if n == 0 {
        return Ok(());
    }

    let emitter = InplaceElemwise::new(op, dtype, dst_layout.ndim());
    let func = function_for(device, &emitter)?;
    let (grid, block) = elementwise_dims(n);
    let desc = first_kernel(&emitter)?.with_launch(grid, block);

    let mut args = Vec::with_capacity(3 * dst_layout.ndim() + 5);
    args.push(KernelArg::Size(n as u64));
    args.extend(dst_layout.shape().iter().map(|&d| KernelArg::Size(d as u64)));
    args.extend(dst_layout.strides().iter().map(|&s| KernelArg::SSize(s as i64)));
    args.push(KernelArg::Buffer(dst));
    args.push(KernelArg::Size(dst_off));
    args.extend(src_strides.iter().map(|&s| KernelArg::SSize(s as i64)));
    args.push(KernelArg::Buffer(src));
    args.push(KernelArg::Size(src_off));

    unsafe { launch(device, &func, &desc, &args) }
}

/// Unsigned integer dtype moving `elem_size` bytes per element
pub(crate) fn bits_dtype(elem_size: usize) -> Result<DType> {
    match elem_size {
        1 => Ok(DType::U8),
        2 => Ok(DType::U16),
        4 => Ok(DType::U32),
        8 => Ok(DType::U64),
        _ => Err(Error::Internal(format!(
            "no element copy for {}-byte elements",
            elem_size
        ))),
    }
}

//! 异步分流的属性测试
//!
//! 使用 proptest 验证：任意数量、任意内容的主动上报帧与同步应答交错时，
//! 应答总是交给调用者，上报帧按到达顺序进入队列；重新配置后队列为空，旧模式的数据不会留到新模式。

mod common;

use bpio_protocol::{ModeConfig, SpiConfig, UartConfig};
use common::FakeDevice;
use proptest::prelude::*;

fn frames() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..24), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// 应答与上报帧正确分离，上报帧保持到达顺序
    #[test]
    fn reply_and_async_frames_are_separated(
        rounds in prop::collection::vec((frames(), prop::collection::vec(any::<u8>(), 0..16)), 1..4),
        chunk in prop::option::of(1usize..9),
    ) {
        let (client, device) = FakeDevice::connect();
        client.configure(ModeConfig::Uart(UartConfig::default())).unwrap();
        device.handle.set_max_read_chunk(chunk);

        let mut expected_async = Vec::new();
        for (async_frames, reply) in &rounds {
            for f in async_frames {
                device.queue_async_before_reply(f);
                expected_async.push(f.clone());
            }
            device.queue_data_reply(reply);

            let result = client.transact(b"req", reply.len()).unwrap();
            prop_assert_eq!(&result.data, reply);
            prop_assert_eq!(result.bytes_read, reply.len());
        }

        let drained = client.drain_async_queue();
        let data: Vec<Vec<u8>> = drained.iter().map(|f| f.data.clone()).collect();
        prop_assert_eq!(data, expected_async);
        prop_assert!(drained.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    /// 每次成功配置之后异步队列为空
    #[test]
    fn configure_always_leaves_queue_empty(
        pending in frames(),
        on_link in frames(),
        before_ack in frames(),
        spi_first in any::<bool>(),
    ) {
        let (client, device) = FakeDevice::connect();
        let first = if spi_first {
            ModeConfig::Spi(SpiConfig::default())
        } else {
            ModeConfig::Uart(UartConfig::default())
        };
        client.configure(first).unwrap();

        for f in &pending {
            device.queue_async_before_reply(f);
        }
        client.transact(b"x", 0).unwrap();
        prop_assert_eq!(client.async_queue_len(), pending.len());

        // 旧模式数据：已在链路上的，以及配置应答之前到达的
        for f in &on_link {
            device.inject_async(f);
        }
        for f in &before_ack {
            device.queue_async_before_ack(f);
        }

        client.configure(ModeConfig::Uart(UartConfig { speed: 57_600, ..Default::default() })).unwrap();
        prop_assert_eq!(client.async_queue_len(), 0);
        prop_assert!(client.drain_async_queue().is_empty());
    }
}

//! Transaction events captured from a juno testnet transaction that emitted three
//! `send_packet` events. Keys and values are base64 encoded, as delivered by
//! Tendermint 0.34 nodes.

use super::events::Event;

fn event(kind: &str, attributes: &[(&str, &str)]) -> Event {
    Event::new(kind, attributes.iter().copied())
}

pub fn juno_send_packet_events() -> Vec<Event> {
    vec![
        event(
            "coin_spent",
            &[
                ("c3BlbmRlcg==", "anVubzEwMHM0NXM0aDk0cWRrY2FmbW1ycWZsdGxyZ3lxd3luNmUwNWp4Mg=="),
                ("YW1vdW50", "MzY5NDV1anVub3g="),
            ],
        ),
        event(
            "coin_received",
            &[
                ("cmVjZWl2ZXI=", "anVubzE3eHBmdmFrbTJhbWc5NjJ5bHM2Zjg0ejNrZWxsOGM1bHh0cW12cA=="),
                ("YW1vdW50", "MzY5NDV1anVub3g="),
            ],
        ),
        event(
            "transfer",
            &[
                ("cmVjaXBpZW50", "anVubzE3eHBmdmFrbTJhbWc5NjJ5bHM2Zjg0ejNrZWxsOGM1bHh0cW12cA=="),
                ("c2VuZGVy", "anVubzEwMHM0NXM0aDk0cWRrY2FmbW1ycWZsdGxyZ3lxd3luNmUwNWp4Mg=="),
                ("YW1vdW50", "MzY5NDV1anVub3g="),
            ],
        ),
        event(
            "message",
            &[
                ("c2VuZGVy", "anVubzEwMHM0NXM0aDk0cWRrY2FmbW1ycWZsdGxyZ3lxd3luNmUwNWp4Mg=="),
            ],
        ),
        event(
            "tx",
            &[
                ("ZmVl", "MzY5NDV1anVub3g="),
            ],
        ),
        event(
            "tx",
            &[
                ("YWNjX3NlcQ==", "anVubzEwMHM0NXM0aDk0cWRrY2FmbW1ycWZsdGxyZ3lxd3luNmUwNWp4Mi8xMjQ5Mg=="),
            ],
        ),
        event(
            "tx",
            &[
                ("c2lnbmF0dXJl", "Sm42eW9WYlFPdFIxWlNHRW1lQmQ4c2VaOTl5RHlqdlJ2eU8rR1hGL1FGaDh3bzR2Tm5EckFFUzNxNmk0Sy9XTnhhdkNFRDAxVXNSK0hJYVB2djdRNkE9PQ=="),
            ],
        ),
        event(
            "message",
            &[
                ("YWN0aW9u", "L2Nvc213YXNtLndhc20udjEuTXNnRXhlY3V0ZUNvbnRyYWN0"),
            ],
        ),
        event(
            "message",
            &[
                ("bW9kdWxl", "d2FzbQ=="),
                ("c2VuZGVy", "anVubzEwMHM0NXM0aDk0cWRrY2FmbW1ycWZsdGxyZ3lxd3luNmUwNWp4Mg=="),
            ],
        ),
        event(
            "execute",
            &[
                ("X2NvbnRyYWN0X2FkZHJlc3M=", "anVubzE0eWYyNHBmY3pjc2xjaGRyMDR1NXAyeXc5enhmNmN2czN2aGU5cjlzcmY1cGc2eTJwN25xZHFuN2tu"),
            ],
        ),
        event(
            "execute",
            &[
                ("X2NvbnRyYWN0X2FkZHJlc3M=", "anVubzFlN3ZzNzZtYXJrc2h1czM5ZXlmZWZoMnkzdDlndWdlNHQwa3ZxeWEzcTZ2YW1nc2VqaDRxOGx4dHE5"),
            ],
        ),
        event(
            "wasm",
            &[
                ("X2NvbnRyYWN0X2FkZHJlc3M=", "anVubzFlN3ZzNzZtYXJrc2h1czM5ZXlmZWZoMnkzdDlndWdlNHQwa3ZxeWEzcTZ2YW1nc2VqaDRxOGx4dHE5"),
                ("YWN0aW9u", "ZXhlY3V0ZV9nZXRfbmV4dF9yYW5kb21uZXNz"),
            ],
        ),
        event(
            "send_packet",
            &[
                ("cGFja2V0X2NoYW5uZWxfb3JkZXJpbmc=", "T1JERVJfVU5PUkRFUkVE"),
                ("cGFja2V0X2Nvbm5lY3Rpb24=", "Y29ubmVjdGlvbi0zMQ=="),
                ("cGFja2V0X2RhdGE=", "eyJhZnRlciI6IjE2NjYxNjkwMDM0MTM1NzgyNjkiLCJzZW5kZXIiOiJqdW5vMTR5ZjI0cGZjemNzbGNoZHIwNHU1cDJ5dzl6eGY2Y3ZzM3ZoZTlyOXNyZjVwZzZ5MnA3bnFkcW43a24iLCJqb2JfaWQiOiJzaW1vbi1yb2xsLTEifQ=="),
                ("cGFja2V0X2RhdGFfaGV4", "N2IyMjYxNjY3NDY1NzIyMjNhMjIzMTM2MzYzNjMxMzYzOTMwMzAzMzM0MzEzMzM1MzczODMyMzYzOTIyMmMyMjczNjU2ZTY0NjU3MjIyM2EyMjZhNzU2ZTZmMzEzNDc5NjYzMjM0NzA2NjYzN2E2MzczNmM2MzY4NjQ3MjMwMzQ3NTM1NzAzMjc5NzczOTdhNzg2NjM2NjM3NjczMzM3NjY4NjUzOTcyMzk3MzcyNjYzNTcwNjczNjc5MzI3MDM3NmU3MTY0NzE2ZTM3NmI2ZTIyMmMyMjZhNmY2MjVmNjk2NDIyM2EyMjczNjk2ZDZmNmUyZDcyNmY2YzZjMmQzMTIyN2Q="),
                ("cGFja2V0X2RzdF9jaGFubmVs", "Y2hhbm5lbC0xMA=="),
                ("cGFja2V0X2RzdF9wb3J0", "d2FzbS5ub2lzMWo3bTRmNjhscnVjZWc1eHEzZ2ZrZmRnZGd6MDJ2aHZscTJwNjd2Zjl2M2h3ZHlkYWF0M3NhanpjeTU="),
                ("cGFja2V0X3NlcXVlbmNl", "NzUyNA=="),
                ("cGFja2V0X3NyY19jaGFubmVs", "Y2hhbm5lbC00Mg=="),
                ("cGFja2V0X3NyY19wb3J0", "d2FzbS5qdW5vMWU3dnM3Nm1hcmtzaHVzMzlleWZlZmgyeTN0OWd1Z2U0dDBrdnF5YTNxNnZhbWdzZWpoNHE4bHh0cTk="),
                ("cGFja2V0X3RpbWVvdXRfaGVpZ2h0", "MC0w"),
                ("cGFja2V0X3RpbWVvdXRfdGltZXN0YW1w", "MTY2NjE3MjYwMDQxMzU3ODI2OQ=="),
            ],
        ),
        event(
            "execute",
            &[
                ("X2NvbnRyYWN0X2FkZHJlc3M=", "anVubzFlN3ZzNzZtYXJrc2h1czM5ZXlmZWZoMnkzdDlndWdlNHQwa3ZxeWEzcTZ2YW1nc2VqaDRxOGx4dHE5"),
            ],
        ),
        event(
            "wasm",
            &[
                ("X2NvbnRyYWN0X2FkZHJlc3M=", "anVubzFlN3ZzNzZtYXJrc2h1czM5ZXlmZWZoMnkzdDlndWdlNHQwa3ZxeWEzcTZ2YW1nc2VqaDRxOGx4dHE5"),
                ("YWN0aW9u", "ZXhlY3V0ZV9nZXRfbmV4dF9yYW5kb21uZXNz"),
            ],
        ),
        event(
            "send_packet",
            &[
                ("cGFja2V0X2NoYW5uZWxfb3JkZXJpbmc=", "T1JERVJfVU5PUkRFUkVE"),
                ("cGFja2V0X2Nvbm5lY3Rpb24=", "Y29ubmVjdGlvbi0zMQ=="),
                ("cGFja2V0X2RhdGE=", "eyJhZnRlciI6IjE2NjYxNjkwMDM0MTM1NzgyNjkiLCJzZW5kZXIiOiJqdW5vMTR5ZjI0cGZjemNzbGNoZHIwNHU1cDJ5dzl6eGY2Y3ZzM3ZoZTlyOXNyZjVwZzZ5MnA3bnFkcW43a24iLCJqb2JfaWQiOiJzaW1vbi1yb2xsLTIifQ=="),
                ("cGFja2V0X2RhdGFfaGV4", "N2IyMjYxNjY3NDY1NzIyMjNhMjIzMTM2MzYzNjMxMzYzOTMwMzAzMzM0MzEzMzM1MzczODMyMzYzOTIyMmMyMjczNjU2ZTY0NjU3MjIyM2EyMjZhNzU2ZTZmMzEzNDc5NjYzMjM0NzA2NjYzN2E2MzczNmM2MzY4NjQ3MjMwMzQ3NTM1NzAzMjc5NzczOTdhNzg2NjM2NjM3NjczMzM3NjY4NjUzOTcyMzk3MzcyNjYzNTcwNjczNjc5MzI3MDM3NmU3MTY0NzE2ZTM3NmI2ZTIyMmMyMjZhNmY2MjVmNjk2NDIyM2EyMjczNjk2ZDZmNmUyZDcyNmY2YzZjMmQzMjIyN2Q="),
                ("cGFja2V0X2RzdF9jaGFubmVs", "Y2hhbm5lbC0xMA=="),
                ("cGFja2V0X2RzdF9wb3J0", "d2FzbS5ub2lzMWo3bTRmNjhscnVjZWc1eHEzZ2ZrZmRnZGd6MDJ2aHZscTJwNjd2Zjl2M2h3ZHlkYWF0M3NhanpjeTU="),
                ("cGFja2V0X3NlcXVlbmNl", "NzUyNQ=="),
                ("cGFja2V0X3NyY19jaGFubmVs", "Y2hhbm5lbC00Mg=="),
                ("cGFja2V0X3NyY19wb3J0", "d2FzbS5qdW5vMWU3dnM3Nm1hcmtzaHVzMzlleWZlZmgyeTN0OWd1Z2U0dDBrdnF5YTNxNnZhbWdzZWpoNHE4bHh0cTk="),
                ("cGFja2V0X3RpbWVvdXRfaGVpZ2h0", "MC0w"),
                ("cGFja2V0X3RpbWVvdXRfdGltZXN0YW1w", "MTY2NjE3MjYwMDQxMzU3ODI2OQ=="),
            ],
        ),
        event(
            "execute",
            &[
                ("X2NvbnRyYWN0X2FkZHJlc3M=", "anVubzFlN3ZzNzZtYXJrc2h1czM5ZXlmZWZoMnkzdDlndWdlNHQwa3ZxeWEzcTZ2YW1nc2VqaDRxOGx4dHE5"),
            ],
        ),
        event(
            "wasm",
            &[
                ("X2NvbnRyYWN0X2FkZHJlc3M=", "anVubzFlN3ZzNzZtYXJrc2h1czM5ZXlmZWZoMnkzdDlndWdlNHQwa3ZxeWEzcTZ2YW1nc2VqaDRxOGx4dHE5"),
                ("YWN0aW9u", "ZXhlY3V0ZV9nZXRfbmV4dF9yYW5kb21uZXNz"),
            ],
        ),
        event(
            "send_packet",
            &[
                ("cGFja2V0X2NoYW5uZWxfb3JkZXJpbmc=", "T1JERVJfVU5PUkRFUkVE"),
                ("cGFja2V0X2Nvbm5lY3Rpb24=", "Y29ubmVjdGlvbi0zMQ=="),
                ("cGFja2V0X2RhdGE=", "eyJhZnRlciI6IjE2NjYxNjkwMDM0MTM1NzgyNjkiLCJzZW5kZXIiOiJqdW5vMTR5ZjI0cGZjemNzbGNoZHIwNHU1cDJ5dzl6eGY2Y3ZzM3ZoZTlyOXNyZjVwZzZ5MnA3bnFkcW43a24iLCJqb2JfaWQiOiJzaW1vbi1yb2xsLTMifQ=="),
                ("cGFja2V0X2RhdGFfaGV4", "N2IyMjYxNjY3NDY1NzIyMjNhMjIzMTM2MzYzNjMxMzYzOTMwMzAzMzM0MzEzMzM1MzczODMyMzYzOTIyMmMyMjczNjU2ZTY0NjU3MjIyM2EyMjZhNzU2ZTZmMzEzNDc5NjYzMjM0NzA2NjYzN2E2MzczNmM2MzY4NjQ3MjMwMzQ3NTM1NzAzMjc5NzczOTdhNzg2NjM2NjM3NjczMzM3NjY4NjUzOTcyMzk3MzcyNjYzNTcwNjczNjc5MzI3MDM3NmU3MTY0NzE2ZTM3NmI2ZTIyMmMyMjZhNmY2MjVmNjk2NDIyM2EyMjczNjk2ZDZmNmUyZDcyNmY2YzZjMmQzMzIyN2Q="),
                ("cGFja2V0X2RzdF9jaGFubmVs", "Y2hhbm5lbC0xMA=="),
                ("cGFja2V0X2RzdF9wb3J0", "d2FzbS5ub2lzMWo3bTRmNjhscnVjZWc1eHEzZ2ZrZmRnZGd6MDJ2aHZscTJwNjd2Zjl2M2h3ZHlkYWF0M3NhanpjeTU="),
                ("cGFja2V0X3NlcXVlbmNl", "NzUyNg=="),
                ("cGFja2V0X3NyY19jaGFubmVs", "Y2hhbm5lbC00Mg=="),
                ("cGFja2V0X3NyY19wb3J0", "d2FzbS5qdW5vMWU3dnM3Nm1hcmtzaHVzMzlleWZlZmgyeTN0OWd1Z2U0dDBrdnF5YTNxNnZhbWdzZWpoNHE4bHh0cTk="),
                ("cGFja2V0X3RpbWVvdXRfaGVpZ2h0", "MC0w"),
                ("cGFja2V0X3RpbWVvdXRfdGltZXN0YW1w", "MTY2NjE3MjYwMDQxMzU3ODI2OQ=="),
            ],
        ),
    ]
}
